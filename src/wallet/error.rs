use thiserror::Error;
use tonlib_core::cell::TonCellError;
use tonlib_core::message::TonMessageError;
use tonlib_core::wallet::error::MnemonicError;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] MnemonicError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Cell error: {0}")]
    Cell(#[from] TonCellError),

    #[error("Message encoding error: {0}")]
    Message(#[from] TonMessageError),
}
