//! Telegram front end
//!
//! - [`api`] - Bot API client and the chat [`TelegramNotifier`]
//! - [`bot`] - long-polling command loop

pub mod api;
pub mod bot;

pub use api::{TelegramApi, TelegramError, TelegramNotifier};
pub use bot::{CommandHandler, TelegramBot};
