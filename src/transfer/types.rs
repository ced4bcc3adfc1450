//! Transfer Types

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tonlib_core::{TonAddress, TonAddressParseError};

use super::confirmation::ConfirmationResult;
use super::error::TransferError;

/// Correlation token embedded in the jetton message and echoed back in the
/// recipient's transfer notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryId(pub u64);

impl QueryId {
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who asked for the transfer; progress messages are routed back to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account address together with the flags of the form it was given in.
/// Raw `wc:hex` input counts as bounceable and not test-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: TonAddress,
    pub bounceable: bool,
    pub test_only: bool,
}

impl Destination {
    pub fn parse(input: &str) -> Result<Self, TonAddressParseError> {
        let input = input.trim();
        if input.contains(':') {
            return Ok(Self {
                address: TonAddress::from_hex_str(input)?,
                bounceable: true,
                test_only: false,
            });
        }
        let (address, non_bounceable, test_only) = if input.contains(['-', '_']) {
            TonAddress::from_base64_url_flags(input)?
        } else {
            TonAddress::from_base64_std_flags(input)?
        };
        Ok(Self {
            address,
            bounceable: !non_bounceable,
            test_only,
        })
    }
}

/// Url-safe friendly form with the flags it was parsed with
impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            &self
                .address
                .to_base64_url_flags(!self.bounceable, self.test_only),
        )
    }
}

/// One validated transfer
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub destination: Destination,
    /// Token amount in smallest units
    pub amount: u128,
    pub query_id: QueryId,
}

/// Dispatched transfer whose confirmation runs in the background
#[derive(Debug)]
pub struct Dispatch {
    pub query_id: QueryId,
    pub settlement: JoinHandle<ConfirmationResult>,
}

#[derive(Debug)]
pub enum TransferOutcome {
    Dispatched(Dispatch),
    Rejected(TransferError),
}

impl TransferOutcome {
    /// Text reply for the caller
    pub fn reply(&self) -> &'static str {
        match self {
            TransferOutcome::Dispatched(_) => "ok",
            TransferOutcome::Rejected(e) => e.reply(),
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self, TransferOutcome::Dispatched(_))
    }
}
