use serde::{Deserialize, Serialize};
use tonlib_core::wallet::wallet_version::WalletVersion as ContractVersion;

/// Wallet contracts the service can sign for. Code cells ship with
/// `tonlib-core`, so the version alone fixes the contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletVersion {
    V3R2,
    V4R2,
}

impl WalletVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletVersion::V3R2 => "v3R2",
            WalletVersion::V4R2 => "v4R2",
        }
    }

    pub(crate) fn contract(self) -> ContractVersion {
        match self {
            WalletVersion::V3R2 => ContractVersion::V3R2,
            WalletVersion::V4R2 => ContractVersion::V4R2,
        }
    }
}
