//! Long-polling bot
//!
//! | command | effect |
//! |---|---|
//! | `/start` | hint reply, web-app menu button `<web_app_url>?id=<chat>`, command list |
//! | `/send <address>` | airdrop to `<address>` through the shared kernel |
//! | `/help` | usage |

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::api::{BotCommand, TelegramApi, Update};
use crate::transfer::{CallerId, TransferError, TransferKernel, TransferOutcome};

pub const START_REPLY: &str = "Type /help to get more information";
pub const HELP_REPLY: &str = "Type command */send yourAddress* to send your token";
pub const WRONG_FORMAT_REPLY: &str = "Wrong format, Syntax: \n\n/send yourAddress";
pub const MISSING_ARGS_REPLY: &str = "Missing arguements, Syntax: \n\n/send yourAddress";
pub const MENU_BUTTON_TEXT: &str = "launch App";

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Side effects requested by a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    Reply(String),
    SetMenuButton { url: String },
    SetCommands(Vec<BotCommand>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command<'a> {
    Start,
    Help,
    Send(&'a str),
}

/// `/cmd` or `/cmd@BotName`, rest of the text kept as-is
fn parse_command(text: &str) -> Option<Command<'_>> {
    let head = text.split(' ').next()?;
    let name = head.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    match name {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        "send" => Some(Command::Send(text)),
        _ => None,
    }
}

/// Split on single spaces: exactly one argument is accepted
fn send_argument(text: &str) -> Result<&str, &'static str> {
    let parts: Vec<&str> = text.split(' ').collect();
    match parts.len() {
        2 => Ok(parts[1]),
        n if n > 2 => Err(WRONG_FORMAT_REPLY),
        _ => Err(MISSING_ARGS_REPLY),
    }
}

pub fn default_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("send", "Enter your address to start a transfer"),
        BotCommand::new("help", "Show the command list"),
    ]
}

/// Turns chat messages into actions; no Bot API access
pub struct CommandHandler {
    kernel: Arc<TransferKernel>,
    transfer_amount: u128,
    web_app_url: String,
}

impl CommandHandler {
    pub fn new(kernel: Arc<TransferKernel>, transfer_amount: u128, web_app_url: String) -> Self {
        Self {
            kernel,
            transfer_amount,
            web_app_url,
        }
    }

    pub async fn handle(&self, chat_id: i64, text: &str) -> Vec<BotAction> {
        match parse_command(text) {
            Some(Command::Start) => {
                let mut actions = vec![BotAction::Reply(START_REPLY.to_string())];
                if !self.web_app_url.is_empty() {
                    actions.push(BotAction::SetMenuButton {
                        url: format!("{}?id={}", self.web_app_url, chat_id),
                    });
                }
                actions.push(BotAction::SetCommands(default_commands()));
                actions
            }
            Some(Command::Help) => vec![BotAction::Reply(HELP_REPLY.to_string())],
            Some(Command::Send(text)) => self.handle_send(chat_id, text).await,
            None => vec![],
        }
    }

    async fn handle_send(&self, chat_id: i64, text: &str) -> Vec<BotAction> {
        let dest = match send_argument(text) {
            Ok(dest) => dest,
            Err(reply) => return vec![BotAction::Reply(reply.to_string())],
        };

        info!(chat_id, dest, "Telegram transfer request");
        let caller = CallerId::new(chat_id.to_string());
        match self
            .kernel
            .transfer(dest, self.transfer_amount, &caller)
            .await
        {
            // Progress and failures after dispatch arrive through the notifier
            TransferOutcome::Dispatched(_) => vec![],
            TransferOutcome::Rejected(TransferError::BroadcastFailure(_)) => vec![],
            TransferOutcome::Rejected(e) => vec![BotAction::Reply(e.reply().to_string())],
        }
    }
}

pub struct TelegramBot {
    api: Arc<TelegramApi>,
    handler: CommandHandler,
    poll_timeout_secs: u64,
}

impl TelegramBot {
    pub fn new(api: Arc<TelegramApi>, handler: CommandHandler, poll_timeout_secs: u64) -> Self {
        Self {
            api,
            handler,
            poll_timeout_secs,
        }
    }

    /// getUpdates loop; never returns
    pub async fn run(self) {
        info!("Telegram bot started");
        let mut offset = 0i64;
        loop {
            let updates = match self.api.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };
            for update in updates {
                offset = offset.max(update.update_id + 1);
                self.dispatch(update).await;
            }
        }
    }

    async fn dispatch(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text else {
            return;
        };
        let chat_id = message.chat.id;

        for action in self.handler.handle(chat_id, &text).await {
            let result = match &action {
                BotAction::Reply(reply) => {
                    self.api.send_message(&chat_id.to_string(), reply).await
                }
                BotAction::SetMenuButton { url } => {
                    self.api
                        .set_chat_menu_button(chat_id, MENU_BUTTON_TEXT, url)
                        .await
                }
                BotAction::SetCommands(commands) => self.api.set_my_commands(commands).await,
            };
            if let Err(e) = result {
                warn!(chat_id, error = %e, ?action, "Bot action failed");
            }
        }
    }
}
