//! Jetton Airdrop Service
//!
//! ```text
//! ┌──────────┐   ┌──────────┐
//! │   HTTP   │   │ Telegram │
//! │ Gateway  │   │   Bot    │
//! └────┬─────┘   └────┬─────┘
//!      └──────┬───────┘
//!       ┌─────▼──────┐    ┌───────────┐
//!       │  Transfer  │───▶│ TonCenter │
//!       │   Kernel   │    │  JSON-RPC │
//!       └────────────┘    └───────────┘
//! ```
//!
//! Usage: `jetton_airdrop [--env dev] [--port 8080]`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use jetton_airdrop::config::AppConfig;
use jetton_airdrop::gateway::{self, AppState};
use jetton_airdrop::ledger::{LedgerClient, TonCenterClient, resolve_endpoint};
use jetton_airdrop::notify::{LogNotifier, Notifier};
use jetton_airdrop::telegram::{CommandHandler, TelegramApi, TelegramBot, TelegramNotifier};
use jetton_airdrop::transfer::{TransferCoordinator, TransferKernel};
use jetton_airdrop::wallet::WalletSession;

/// Command line: `--env <name>` (or `-e`) picks `config/<name>.yaml`,
/// `--port <n>` overrides `gateway.port`. Both accept the `--flag=value` form.
#[derive(Debug, PartialEq, Eq)]
struct LaunchArgs {
    env: String,
    port: Option<u16>,
}

impl LaunchArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut launch = LaunchArgs {
            env: "dev".to_string(),
            port: None,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            match flag.as_str() {
                "--env" | "-e" | "--port" => {
                    let value = match inline.or_else(|| args.next()) {
                        Some(v) => v,
                        None => bail!("{} needs a value", flag),
                    };
                    if flag == "--port" {
                        let port = value
                            .parse()
                            .with_context(|| format!("bad port {}", value))?;
                        launch.port = Some(port);
                    } else {
                        launch.env = value;
                    }
                }
                _ => {}
            }
        }
        Ok(launch)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let LaunchArgs { env, port } = LaunchArgs::parse(std::env::args().skip(1))?;
    let app_config = AppConfig::load(&env)?;
    let _log_guard = jetton_airdrop::logging::init_logging(&app_config);

    info!(
        env = %env,
        version = env!("GIT_HASH"),
        network = %app_config.ton.network,
        "Starting jetton airdrop service"
    );

    // Ledger
    let endpoint = resolve_endpoint(app_config.ton.network, app_config.ton.endpoint.as_deref());
    let api_key = Some(app_config.ton.api_key.expose().to_string()).filter(|k| !k.is_empty());
    let ledger: Arc<dyn LedgerClient> = Arc::new(TonCenterClient::new(endpoint, api_key)?);

    // Wallet: fail closed before serving anything
    if app_config.wallet.mnemonic.is_empty() {
        bail!("wallet mnemonic is not configured");
    }
    let session = Arc::new(
        WalletSession::init(
            app_config.wallet.mnemonic.expose(),
            app_config.wallet.version,
            app_config.wallet.workchain,
            ledger,
        )
        .context("failed to initialize wallet")?,
    );

    // Notifier
    let telegram = &app_config.telegram;
    let bot_api = if telegram.enabled {
        if telegram.bot_token.is_empty() {
            bail!("telegram.enabled is set but no bot token is configured");
        }
        let timeout = Duration::from_secs(telegram.poll_timeout_secs + 10);
        Some(Arc::new(TelegramApi::new(telegram.bot_token.expose(), timeout)?))
    } else {
        None
    };
    let notifier: Arc<dyn Notifier> = match &bot_api {
        Some(api) => Arc::new(TelegramNotifier::new(api.clone())),
        None => {
            warn!("Telegram disabled, notifications go to the log");
            Arc::new(LogNotifier)
        }
    };

    // Kernel shared by both front ends
    let transfer_amount = app_config.transfer_amount_units()?;
    let kernel = Arc::new(TransferKernel::new(
        session,
        TransferCoordinator::new(),
        notifier,
        app_config.kernel_config()?,
    ));

    if let Some(api) = bot_api {
        let handler = CommandHandler::new(
            kernel.clone(),
            transfer_amount,
            telegram.web_app_url.clone(),
        );
        let bot = TelegramBot::new(api, handler, telegram.poll_timeout_secs);
        tokio::spawn(bot.run());
    }

    let port = port.unwrap_or(app_config.gateway.port);
    let state = Arc::new(AppState::new(
        kernel,
        transfer_amount,
        PathBuf::from(&app_config.gateway.public_dir),
    ));
    gateway::run_server(&app_config.gateway.host, port, state).await
}
