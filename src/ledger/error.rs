use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LedgerError {
    #[error("RPC connection failed: {0}")]
    RpcConnection(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}
