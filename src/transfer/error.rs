//! Transfer Error Types
//!
//! Every rejection the kernel can return, with a stable code and the plain
//! text reply shown to callers of both front ends.

use thiserror::Error;
use tonlib_core::cell::TonCellError;

use crate::ledger::LedgerError;
use crate::wallet::WalletError;

#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Invalid destination address: {0}")]
    InvalidDestination(String),

    // === Concurrency ===
    #[error("Another transfer is in progress")]
    Busy,

    // === Funds ===
    #[error("Insufficient balance")]
    InsufficientBalance,

    // === Wallet / Network ===
    #[error("Wallet initialization failed: {0}")]
    WalletInitialization(String),

    #[error("Broadcast failed: {0}")]
    BroadcastFailure(String),

    #[error("Transfer not confirmed after {attempts} attempts")]
    ConfirmationTimeout { attempts: u32 },

    #[error("Ledger unavailable: {0}")]
    Ledger(String),

    #[error("Message encoding failed: {0}")]
    Codec(String),
}

impl TransferError {
    /// Get the error code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidDestination(_) => "INVALID_DESTINATION",
            TransferError::Busy => "BUSY",
            TransferError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            TransferError::WalletInitialization(_) => "WALLET_INITIALIZATION",
            TransferError::BroadcastFailure(_) => "BROADCAST_FAILURE",
            TransferError::ConfirmationTimeout { .. } => "CONFIRMATION_TIMEOUT",
            TransferError::Ledger(_) => "LEDGER_UNAVAILABLE",
            TransferError::Codec(_) => "CODEC_ERROR",
        }
    }

    /// Text reply returned to the caller (HTTP body or chat message)
    pub fn reply(&self) -> &'static str {
        match self {
            TransferError::InvalidDestination(_) => "invalid address",
            TransferError::Busy => "service is busy",
            TransferError::InsufficientBalance => "not enough balance",
            TransferError::WalletInitialization(_)
            | TransferError::BroadcastFailure(_)
            | TransferError::ConfirmationTimeout { .. }
            | TransferError::Ledger(_)
            | TransferError::Codec(_) => "transfer failed",
        }
    }
}

impl From<TonCellError> for TransferError {
    fn from(e: TonCellError) -> Self {
        TransferError::Codec(e.to_string())
    }
}

impl From<LedgerError> for TransferError {
    fn from(e: LedgerError) -> Self {
        TransferError::Ledger(e.to_string())
    }
}

impl From<WalletError> for TransferError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::InvalidMnemonic(_) => TransferError::WalletInitialization(e.to_string()),
            WalletError::Ledger(inner) => TransferError::Ledger(inner.to_string()),
            WalletError::Cell(_) | WalletError::Message(_) => TransferError::Codec(e.to_string()),
        }
    }
}
