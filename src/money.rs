//! Money Conversion Module
//!
//! Conversion between human decimal strings ("0.8", "100") and the integer
//! smallest units used on chain. TON itself has 9 decimals (nanotons); a
//! jetton declares its own.
//!
//! ## Usage
//! ```rust
//! use jetton_airdrop::money::{parse_amount, format_amount};
//!
//! let nano = parse_amount("0.8", 9).unwrap();
//! assert_eq!(nano, 800_000_000);
//! assert_eq!(format_amount(nano, 9), "0.8");
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Decimals of the native coin
pub const TON_DECIMALS: u32 = 9;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Convert a decimal string to smallest units
///
/// # Errors
/// * `PrecisionOverflow` - more fractional digits than `decimals`
/// * `InvalidAmount` - zero, or a sign was given
/// * `Overflow` - result does not fit `u128`
/// * `InvalidFormat` - anything else
pub fn parse_amount(amount_str: &str, decimals: u32) -> Result<u128, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidAmount);
    }

    let (whole, frac) = match amount_str.split_once('.') {
        None => (amount_str, ""),
        Some((whole, frac)) => {
            // Require both sides of the dot: no ".5" or "5."
            if whole.is_empty() || frac.is_empty() {
                return Err(MoneyError::InvalidFormat(format!(
                    "incomplete decimal: {}",
                    amount_str
                )));
            }
            if frac.contains('.') {
                return Err(MoneyError::InvalidFormat("multiple decimal points".into()));
            }
            (whole, frac)
        }
    };

    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in {}",
            amount_str
        )));
    }

    // No silent truncation
    if frac.len() > decimals as usize {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac.len() as u32,
            max: decimals,
        });
    }

    let whole_num: u128 = whole.parse().map_err(|_| MoneyError::Overflow)?;
    let frac_num: u128 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals as usize)
            .parse()
            .map_err(|_| MoneyError::InvalidFormat("invalid fractional part".into()))?
    };

    let multiplier = 10u128
        .checked_pow(decimals)
        .ok_or(MoneyError::Overflow)?;
    let amount = whole_num
        .checked_mul(multiplier)
        .and_then(|v| v.checked_add(frac_num))
        .ok_or(MoneyError::Overflow)?;

    if amount == 0 {
        return Err(MoneyError::InvalidAmount);
    }

    Ok(amount)
}

/// Convert smallest units to a trimmed decimal string
pub fn format_amount(value: u128, decimals: u32) -> String {
    match i128::try_from(value)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, decimals).ok())
    {
        Some(d) => d.normalize().to_string(),
        None => format_wide(value, decimals),
    }
}

/// Fallback for values beyond the 96-bit decimal mantissa
fn format_wide(value: u128, decimals: u32) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0.8", TON_DECIMALS).unwrap(), 800_000_000);
        assert_eq!(parse_amount("100", 9).unwrap(), 100_000_000_000);
        assert_eq!(parse_amount(" 1.5 ", 2).unwrap(), 150);
        assert_eq!(parse_amount("7", 0).unwrap(), 7);
    }

    #[test]
    fn test_parse_amount_rejects() {
        assert_eq!(
            parse_amount("1.123", 2),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
        assert_eq!(parse_amount("0", 9), Err(MoneyError::InvalidAmount));
        assert_eq!(parse_amount("-1", 9), Err(MoneyError::InvalidAmount));
        assert!(matches!(parse_amount(".5", 9), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_amount("5.", 9), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_amount("1.2.3", 9), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_amount("1e9", 9), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_amount("", 9), Err(MoneyError::InvalidFormat(_))));
        assert_eq!(
            parse_amount("340282366920938463463374607431768211455", 9),
            Err(MoneyError::Overflow)
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(800_000_000, 9), "0.8");
        assert_eq!(format_amount(100_000_000_000, 9), "100");
        assert_eq!(format_amount(1, 9), "0.000000001");
        assert_eq!(format_amount(u128::MAX, 0), u128::MAX.to_string());
    }

    #[test]
    fn test_format_wide() {
        assert_eq!(format_wide(1_500, 3), "1.5");
        assert_eq!(format_wide(5, 3), "0.005");
        assert_eq!(format_wide(2_000, 3), "2");
    }
}
