//! TON Center JSON-RPC client
//!
//! Talks to `/api/v2/jsonRPC`. Every call is a POST of
//! `{"jsonrpc": "2.0", "id": 1, "method": ..., "params": {...}}` answered by
//! `{"ok": bool, "result": ..., "error": ..., "code": ...}`.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tonlib_core::TonAddress;
use tracing::{debug, info};

use super::error::LedgerError;
use super::{LedgerClient, LedgerTransaction};

/// JSON-RPC request structure
#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: Value,
    id: u64,
}

/// JSON-RPC response structure
#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    #[serde(default)]
    ok: bool,
    result: Option<T>,
    error: Option<String>,
    code: Option<i64>,
}

/// `runGetMethod` result
#[derive(Deserialize, Debug)]
struct RunGetMethodResult {
    exit_code: i64,
    #[serde(default)]
    stack: Vec<Vec<Value>>,
}

#[derive(Deserialize, Debug)]
struct RawTransactionId {
    lt: String,
    hash: String,
}

#[derive(Deserialize, Debug, Default)]
struct RawMsgData {
    #[serde(rename = "@type", default)]
    kind: String,
    body: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawMessage {
    #[serde(default)]
    msg_data: RawMsgData,
}

#[derive(Deserialize, Debug)]
struct RawTransaction {
    transaction_id: RawTransactionId,
    in_msg: Option<RawMessage>,
}

impl From<RawTransaction> for LedgerTransaction {
    fn from(raw: RawTransaction) -> Self {
        let in_msg_body = raw
            .in_msg
            .filter(|m| m.msg_data.kind.is_empty() || m.msg_data.kind == "msg.dataRaw")
            .and_then(|m| m.msg_data.body)
            .filter(|b| !b.is_empty());
        Self {
            lt: raw.transaction_id.lt,
            hash: raw.transaction_id.hash,
            in_msg_body,
        }
    }
}

pub struct TonCenterClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TonCenterClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, LedgerError> {
        info!(endpoint = %endpoint, "Initializing TON Center client");

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                LedgerError::RpcConnection(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    async fn rpc_call<R>(&self, method: &'static str, params: Value) -> Result<R, LedgerError>
    where
        R: for<'de> Deserialize<'de>,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-API-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LedgerError::RpcConnection(format!("HTTP request failed: {}", e)))?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| LedgerError::Parse(format!("Failed to parse response: {}", e)))?;

        if !rpc_response.ok || rpc_response.error.is_some() {
            return Err(LedgerError::Rpc {
                code: rpc_response.code.unwrap_or(-1),
                message: rpc_response
                    .error
                    .unwrap_or_else(|| "request not ok".to_string()),
            });
        }

        rpc_response
            .result
            .ok_or_else(|| LedgerError::Parse(format!("No result in {} response", method)))
    }
}

/// Parse a numeric stack entry: `["num", "0x1a"]`
fn parse_stack_num(entry: &[Value]) -> Result<u64, LedgerError> {
    let kind = entry.first().and_then(Value::as_str).unwrap_or_default();
    let raw = entry
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| LedgerError::Parse(format!("unexpected stack entry {:?}", entry)))?;
    if kind != "num" {
        return Err(LedgerError::Parse(format!("stack entry is {}, not num", kind)));
    }
    let value = match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    value.map_err(|e| LedgerError::Parse(format!("bad stack number {}: {}", raw, e)))
}

#[async_trait]
impl LedgerClient for TonCenterClient {
    async fn get_balance(&self, address: &TonAddress) -> Result<u128, LedgerError> {
        let raw: Value = self
            .rpc_call("getAddressBalance", json!({ "address": address.to_string() }))
            .await?;
        let text = match &raw {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => return Err(LedgerError::Parse(format!("balance is {}", other))),
        };
        text.parse::<u128>()
            .map_err(|e| LedgerError::Parse(format!("bad balance {}: {}", text, e)))
    }

    async fn get_seqno(&self, address: &TonAddress) -> Result<Option<u32>, LedgerError> {
        let result: RunGetMethodResult = self
            .rpc_call(
                "runGetMethod",
                json!({ "address": address.to_string(), "method": "seqno", "stack": [] }),
            )
            .await?;

        if result.exit_code != 0 {
            debug!(exit_code = result.exit_code, "seqno get-method failed, wallet not deployed");
            return Ok(None);
        }
        let entry = result
            .stack
            .first()
            .ok_or_else(|| LedgerError::Parse("empty seqno stack".into()))?;
        let seqno = parse_stack_num(entry)?;
        u32::try_from(seqno)
            .map(Some)
            .map_err(|_| LedgerError::Parse(format!("seqno {} exceeds u32", seqno)))
    }

    async fn get_transactions(
        &self,
        address: &TonAddress,
        limit: u32,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let raw: Vec<RawTransaction> = self
            .rpc_call(
                "getTransactions",
                json!({ "address": address.to_string(), "limit": limit }),
            )
            .await?;
        Ok(raw.into_iter().map(LedgerTransaction::from).collect())
    }

    async fn send_boc(&self, boc: &[u8]) -> Result<(), LedgerError> {
        let _: Value = self
            .rpc_call("sendBoc", json!({ "boc": STANDARD.encode(boc) }))
            .await?;
        Ok(())
    }
}
