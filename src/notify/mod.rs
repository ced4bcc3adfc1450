//! Notification sink
//!
//! Progress and settlement messages are pushed to the caller out of band.
//! The Telegram front end implements [`Notifier`] with `sendMessage`;
//! [`LogNotifier`] is used when no bot is configured.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::transfer::CallerId;

#[derive(Debug, Error, Clone)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, caller: &CallerId, message: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, caller: &CallerId, message: &str) -> Result<(), NotifyError> {
        info!(caller = %caller, message, "Notification");
        Ok(())
    }
}
