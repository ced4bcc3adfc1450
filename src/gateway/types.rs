//! Request / response types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::transfer::CallerId;

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = 0)]
    pub code: i32,
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

/// `POST /jetton/transfer` body
#[derive(Debug, Deserialize, ToSchema)]
pub struct JettonTransferRequest {
    /// Recipient address, raw or user-friendly
    #[schema(example = "EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N")]
    #[serde(default)]
    pub dest: Option<String>,
    /// Telegram chat to notify; string or number
    #[serde(default, rename = "chatID")]
    #[schema(value_type = Option<String>, example = "123456789")]
    pub chat_id: Option<Value>,
}

impl JettonTransferRequest {
    pub fn caller(&self) -> CallerId {
        let id = match &self.chat_id {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        CallerId::new(id)
    }
}

/// Health check response data
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
    /// Service wallet, non-bounceable
    pub wallet_address: String,
    #[schema(example = "testnet")]
    pub network: String,
    /// Build revision
    pub version: String,
}
