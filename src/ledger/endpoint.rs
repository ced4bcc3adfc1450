//! Network selection and endpoint resolution

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    /// Public TON Center JSON-RPC endpoint for this network
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://toncenter.com/api/v2/jsonRPC",
            Network::Testnet => "https://testnet.toncenter.com/api/v2/jsonRPC",
        }
    }

    /// Explorer link for a url-safe transaction hash
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        let subdomain = match self {
            Network::Mainnet => "",
            Network::Testnet => "testnet.",
        };
        format!("https://{}tonviewer.com/transaction/{}", subdomain, tx_hash)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit endpoint wins; otherwise the network's public endpoint
pub fn resolve_endpoint(network: Network, configured: Option<&str>) -> String {
    match configured.map(str::trim).filter(|s| !s.is_empty()) {
        Some(url) => url.to_string(),
        None => network.default_endpoint().to_string(),
    }
}
