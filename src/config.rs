use std::fmt;
use std::fs;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::ledger::Network;
use crate::money::{TON_DECIMALS, parse_amount};
use crate::transfer::types::Destination;
use crate::transfer::{KernelConfig, PollerConfig};
use crate::wallet::WalletVersion;

pub const ENV_MNEMONIC: &str = "AIRDROP_MNEMONIC";
pub const ENV_BOT_TOKEN: &str = "AIRDROP_BOT_TOKEN";
pub const ENV_TONCENTER_API_KEY: &str = "AIRDROP_TONCENTER_API_KEY";

/// String that never shows up in logs or debug output
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    pub ton: TonConfig,
    pub wallet: WalletConfig,
    pub jetton: JettonConfig,
    #[serde(default)]
    pub confirmation: PollerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the operator page
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

fn default_public_dir() -> String {
    "public".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: Secret,
    /// Mini-app URL behind the chat menu button
    #[serde(default)]
    pub web_app_url: String,
    /// Long-poll timeout for getUpdates
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: Secret::default(),
            web_app_url: String::new(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TonConfig {
    pub network: Network,
    /// Overrides the public TON Center endpoint of `network`
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Secret,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalletConfig {
    #[serde(default)]
    pub mnemonic: Secret,
    pub version: WalletVersion,
    #[serde(default)]
    pub workchain: i8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JettonConfig {
    /// The service's own jetton wallet
    pub wallet_address: String,
    pub decimals: u32,
    /// Tokens per airdrop, decimal string
    pub transfer_amount: String,
    /// TON attached to each transfer, decimal string
    #[serde(default = "default_transfer_fee")]
    pub transfer_fee: String,
    #[serde(default = "default_forward_ton_amount")]
    pub forward_ton_amount: String,
}

fn default_transfer_fee() -> String {
    "0.8".to_string()
}

fn default_forward_ton_amount() -> String {
    "0.001".to_string()
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config yaml")
    }

    /// Secrets may come from the environment instead of the file
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(ENV_MNEMONIC) {
            self.wallet.mnemonic = Secret::new(v);
        }
        if let Some(v) = non_empty(ENV_BOT_TOKEN) {
            self.telegram.bot_token = Secret::new(v);
        }
        if let Some(v) = non_empty(ENV_TONCENTER_API_KEY) {
            self.ton.api_key = Secret::new(v);
        }
    }

    /// Amount of jetton per transfer in smallest units
    pub fn transfer_amount_units(&self) -> Result<u128> {
        parse_amount(&self.jetton.transfer_amount, self.jetton.decimals)
            .with_context(|| format!("invalid jetton.transfer_amount {}", self.jetton.transfer_amount))
    }

    pub fn kernel_config(&self) -> Result<KernelConfig> {
        let jetton_wallet = Destination::parse(&self.jetton.wallet_address)
            .with_context(|| format!("invalid jetton.wallet_address {}", self.jetton.wallet_address))?;
        let transfer_fee = parse_amount(&self.jetton.transfer_fee, TON_DECIMALS)
            .with_context(|| format!("invalid jetton.transfer_fee {}", self.jetton.transfer_fee))?;
        let forward_ton_amount = parse_amount(&self.jetton.forward_ton_amount, TON_DECIMALS)
            .with_context(|| {
                format!(
                    "invalid jetton.forward_ton_amount {}",
                    self.jetton.forward_ton_amount
                )
            })?;
        if self.confirmation.max_attempts == 0 {
            bail!("confirmation.max_attempts must be positive");
        }

        let mut config = KernelConfig::new(jetton_wallet, self.ton.network);
        config.jetton_decimals = self.jetton.decimals;
        config.transfer_fee = transfer_fee;
        config.forward_ton_amount = forward_ton_amount;
        config.poller = self.confirmation.clone();
        Ok(config)
    }
}
