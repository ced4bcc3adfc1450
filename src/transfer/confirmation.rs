//! Confirmation Poller
//!
//! Watches the recipient's recent transactions for a jetton transfer
//! notification carrying our query id.
//!
//! ```text
//! Polling --match--> Matched
//!    |
//!    +--max_attempts--> Exhausted
//! ```
//!
//! Fetch failures are logged and still consume an attempt. Bodies that do not
//! decode are skipped.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tonlib_core::TonAddress;
use tracing::{debug, info, warn};

use super::jetton;
use super::types::QueryId;
use crate::ledger::LedgerClient;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
    pub tx_limit: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            interval_ms: 1000,
            tx_limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationResult {
    /// `tx_hash` is url-safe
    Matched { tx_hash: String, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Map base64 `+` / `/` to their url-safe counterparts (all occurrences)
pub fn normalize_hash(hash: &str) -> String {
    hash.replace('+', "-").replace('/', "_")
}

pub struct ConfirmationPoller {
    ledger: Arc<dyn LedgerClient>,
    config: PollerConfig,
}

impl ConfirmationPoller {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: PollerConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub async fn poll(&self, recipient: &TonAddress, query_id: QueryId) -> ConfirmationResult {
        let interval = Duration::from_millis(self.config.interval_ms);

        for attempt in 1..=self.config.max_attempts {
            if let Some(tx_hash) = self.check_once(recipient, query_id).await {
                info!(
                    query_id = %query_id,
                    attempts = attempt,
                    tx_hash = %tx_hash,
                    "Transfer confirmed"
                );
                return ConfirmationResult::Matched {
                    tx_hash,
                    attempts: attempt,
                };
            }
            if attempt < self.config.max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        warn!(
            query_id = %query_id,
            attempts = self.config.max_attempts,
            "Transfer not confirmed, giving up"
        );
        ConfirmationResult::Exhausted {
            attempts: self.config.max_attempts,
        }
    }

    async fn check_once(&self, recipient: &TonAddress, query_id: QueryId) -> Option<String> {
        let txs = match self
            .ledger
            .get_transactions(recipient, self.config.tx_limit)
            .await
        {
            Ok(txs) => txs,
            Err(e) => {
                warn!(query_id = %query_id, error = %e, "Failed to fetch transactions");
                return None;
            }
        };

        txs.into_iter().find_map(|tx| {
            let body = tx.in_msg_body.as_deref()?;
            match jetton::decode_notify_body(body) {
                Ok(Some(id)) if id == query_id.value() => Some(normalize_hash(&tx.hash)),
                Ok(_) => None,
                Err(e) => {
                    debug!(lt = %tx.lt, error = %e, "Skipping undecodable body");
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerError, LedgerTransaction};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tonlib_core::TonHash;
    use tonlib_core::cell::CellBuilder;
    use tonlib_core::tlb_types::tlb::TLB;

    fn notify_body(query_id: u64) -> String {
        CellBuilder::new()
            .store_u32(32, jetton::OP_TRANSFER_NOTIFICATION)
            .unwrap()
            .store_u64(64, query_id)
            .unwrap()
            .build()
            .unwrap()
            .to_boc_b64(true)
            .unwrap()
    }

    fn recipient() -> TonAddress {
        TonAddress::new(0, TonHash::from([1; 32]))
    }

    /// Returns scripted responses; the last one repeats
    struct ScriptedLedger {
        calls: AtomicU32,
        script: Mutex<Vec<Result<Vec<LedgerTransaction>, LedgerError>>>,
    }

    impl ScriptedLedger {
        fn new(script: Vec<Result<Vec<LedgerTransaction>, LedgerError>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                script: Mutex::new(script),
            })
        }
    }

    #[async_trait]
    impl LedgerClient for ScriptedLedger {
        async fn get_balance(&self, _: &TonAddress) -> Result<u128, LedgerError> {
            Ok(0)
        }
        async fn get_seqno(&self, _: &TonAddress) -> Result<Option<u32>, LedgerError> {
            Ok(None)
        }
        async fn get_transactions(
            &self,
            _: &TonAddress,
            _: u32,
        ) -> Result<Vec<LedgerTransaction>, LedgerError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let script = self.script.lock().unwrap();
            script[n.min(script.len() - 1)].clone()
        }
        async fn send_boc(&self, _: &[u8]) -> Result<(), LedgerError> {
            Ok(())
        }
    }

    fn fast() -> PollerConfig {
        PollerConfig {
            max_attempts: 120,
            interval_ms: 0,
            tx_limit: 10,
        }
    }

    fn tx(hash: &str, body: Option<String>) -> LedgerTransaction {
        LedgerTransaction {
            lt: "1".into(),
            hash: hash.into(),
            in_msg_body: body,
        }
    }

    #[test]
    fn test_normalize_hash_replaces_all() {
        assert_eq!(normalize_hash("abc+12/=="), "abc-12_==");
        assert_eq!(normalize_hash("a+b+c/d/e"), "a-b-c_d_e");
    }

    #[tokio::test]
    async fn test_exhausts_after_exact_attempts() {
        let ledger = ScriptedLedger::new(vec![Ok(vec![])]);
        let poller = ConfirmationPoller::new(ledger.clone(), fast());
        let result = poller.poll(&recipient(), QueryId(7)).await;
        assert_eq!(result, ConfirmationResult::Exhausted { attempts: 120 });
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 120);
    }

    #[tokio::test]
    async fn test_matches_on_later_attempt() {
        let ledger = ScriptedLedger::new(vec![
            Err(LedgerError::RpcConnection("down".into())),
            Ok(vec![tx("other", Some(notify_body(6)))]),
            Ok(vec![
                tx("garbage", Some("!!!".into())),
                tx("abc+12/==", Some(notify_body(7))),
            ]),
        ]);
        let poller = ConfirmationPoller::new(ledger.clone(), fast());
        let result = poller.poll(&recipient(), QueryId(7)).await;
        assert_eq!(
            result,
            ConfirmationResult::Matched {
                tx_hash: "abc-12_==".into(),
                attempts: 3
            }
        );
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_errors_count_as_attempts() {
        let ledger = ScriptedLedger::new(vec![Err(LedgerError::Parse("bad".into()))]);
        let config = PollerConfig {
            max_attempts: 5,
            ..fast()
        };
        let poller = ConfirmationPoller::new(ledger.clone(), config);
        let result = poller.poll(&recipient(), QueryId(1)).await;
        assert_eq!(result, ConfirmationResult::Exhausted { attempts: 5 });
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 5);
    }
}
