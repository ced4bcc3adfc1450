//! Remote Ledger Client
//!
//! Read (balance, wallet seqno, recent transactions) and write (broadcast a
//! serialized message) access to the TON network. The core only depends on
//! the [`LedgerClient`] trait; [`TonCenterClient`] is the HTTP implementation.

pub mod endpoint;
pub mod error;
pub mod toncenter;

pub use endpoint::{Network, resolve_endpoint};
pub use error::LedgerError;
pub use toncenter::TonCenterClient;

use async_trait::async_trait;
use tonlib_core::TonAddress;

/// Transaction as seen in an account's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    /// Logical time, decimal string
    pub lt: String,
    /// Transaction hash, standard base64
    pub hash: String,
    /// Inbound message body as a base64 BOC (absent for external or text bodies)
    pub in_msg_body: Option<String>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Balance in nanotons
    async fn get_balance(&self, address: &TonAddress) -> Result<u128, LedgerError>;

    /// Wallet `seqno` get-method; `None` while the contract is not deployed
    async fn get_seqno(&self, address: &TonAddress) -> Result<Option<u32>, LedgerError>;

    /// Most recent transactions first
    async fn get_transactions(
        &self,
        address: &TonAddress,
        limit: u32,
    ) -> Result<Vec<LedgerTransaction>, LedgerError>;

    /// Submit a serialized external message
    async fn send_boc(&self, boc: &[u8]) -> Result<(), LedgerError>;
}
