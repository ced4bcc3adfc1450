//! Jetton Airdrop Service
//!
//! One-shot jetton transfers on TON, triggered over HTTP or a Telegram bot
//! command, with settlement confirmed by watching the recipient's history.
//!
//! # Modules
//!
//! - [`ledger`] - remote ledger client (TON Center JSON-RPC)
//! - [`wallet`] - key derivation and the signing session over a v3R2/v4R2 wallet
//! - [`transfer`] - jetton codec, coordinator, confirmation poller, kernel
//! - [`notify`] - out-of-band notification sink
//! - [`gateway`] - HTTP front end
//! - [`telegram`] - Telegram front end
//! - [`money`] - decimal string <-> smallest unit conversion

pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod notify;
pub mod telegram;
pub mod transfer;
pub mod wallet;

pub use ledger::{LedgerClient, LedgerError, LedgerTransaction, Network, TonCenterClient};
pub use notify::{LogNotifier, Notifier};
pub use transfer::{
    CallerId, ConfirmationResult, KernelConfig, QueryId, TransferCoordinator, TransferError,
    TransferKernel, TransferOutcome,
};
pub use transfer::types::Destination;
pub use wallet::{WalletError, WalletSession, WalletVersion};
