//! Telegram Bot API client
//!
//! `POST https://api.telegram.org/bot<token>/<method>` with a JSON body,
//! answered by `{"ok": bool, "result": ..., "description": ..., "error_code": ...}`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::notify::{Notifier, NotifyError};
use crate::transfer::CallerId;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error, Clone)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
struct BotResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: &str, description: &str) -> Self {
        Self {
            command: command.to_string(),
            description: description.to_string(),
        }
    }
}

pub struct TelegramApi {
    base_url: String,
    client: reqwest::Client,
}

impl TelegramApi {
    /// `request_timeout` must exceed the getUpdates long-poll timeout
    pub fn new(token: &str, request_timeout: Duration) -> Result<Self, TelegramError> {
        Self::with_base_url(API_BASE, token, request_timeout)
    }

    pub fn with_base_url(
        base: &str,
        token: &str,
        request_timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TelegramError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            base_url: format!("{}/bot{}", base.trim_end_matches('/'), token),
            client,
        })
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<R, TelegramError> {
        debug!(method, "Bot API call");
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&params)
            .send()
            .await
            // reqwest errors embed the URL, which carries the token
            .map_err(|e| TelegramError::Http(e.without_url().to_string()))?;

        let body: BotResponse<R> = response
            .json()
            .await
            .map_err(|e| TelegramError::Parse(e.without_url().to_string()))?;
        parse_response(method, body)
    }

    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": timeout_secs, "allowed_updates": ["message"] }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let _: Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    pub async fn set_chat_menu_button(
        &self,
        chat_id: i64,
        text: &str,
        url: &str,
    ) -> Result<(), TelegramError> {
        let _: Value = self
            .call(
                "setChatMenuButton",
                json!({
                    "chat_id": chat_id,
                    "menu_button": { "type": "web_app", "text": text, "web_app": { "url": url } }
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError> {
        let _: Value = self
            .call("setMyCommands", json!({ "commands": commands }))
            .await?;
        Ok(())
    }
}

impl fmt::Debug for TelegramApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TelegramApi { token: [REDACTED] }")
    }
}

fn parse_response<R>(method: &str, body: BotResponse<R>) -> Result<R, TelegramError> {
    if !body.ok {
        return Err(TelegramError::Api {
            code: body.error_code.unwrap_or(-1),
            description: body.description.unwrap_or_default(),
        });
    }
    body.result
        .ok_or_else(|| TelegramError::Parse(format!("No result in {} response", method)))
}

/// Delivers notifications as chat messages
pub struct TelegramNotifier {
    api: std::sync::Arc<TelegramApi>,
}

impl TelegramNotifier {
    pub fn new(api: std::sync::Arc<TelegramApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, caller: &CallerId, message: &str) -> Result<(), NotifyError> {
        if caller.as_str().is_empty() {
            return Err(NotifyError::Delivery("no chat id".into()));
        }
        self.api
            .send_message(caller.as_str(), message)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_updates() {
        let raw = r#"{"ok":true,"result":[
            {"update_id":10,"message":{"message_id":1,"chat":{"id":42,"type":"private"},"text":"/start"}},
            {"update_id":11,"edited_message":{"chat":{"id":42}}}
        ]}"#;
        let body: BotResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = parse_response("getUpdates", body).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].message.as_ref().unwrap().chat.id, 42);
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn test_api_error() {
        let raw = r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#;
        let body: BotResponse<Value> = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            parse_response("getMe", body),
            Err(TelegramError::Api { code: 401, .. })
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let api = TelegramApi::new("123:secret", Duration::from_secs(5)).unwrap();
        assert!(!format!("{:?}", api).contains("secret"));
    }

    #[tokio::test]
    async fn test_notifier_requires_chat_id() {
        let api = TelegramApi::new("123:secret", Duration::from_secs(5)).unwrap();
        let n = TelegramNotifier::new(std::sync::Arc::new(api));
        assert!(n.send(&CallerId::new(""), "hi").await.is_err());
    }
}
