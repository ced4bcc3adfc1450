use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use tonlib_core::cell::CellBuilder;
use tonlib_core::tlb_types::block::message::Message;
use tonlib_core::tlb_types::tlb::TLB;
use tonlib_core::wallet::mnemonic::KeyPair;
use tonlib_core::{TonAddress, TonHash};

use jetton_airdrop::gateway::AppState;
use jetton_airdrop::gateway::handlers::jetton_transfer;
use jetton_airdrop::gateway::types::JettonTransferRequest;
use jetton_airdrop::ledger::{LedgerClient, LedgerError, LedgerTransaction, Network};
use jetton_airdrop::notify::{Notifier, NotifyError};
use jetton_airdrop::telegram::CommandHandler;
use jetton_airdrop::telegram::bot::BotAction;
use jetton_airdrop::transfer::jetton::{OP_TRANSFER, OP_TRANSFER_NOTIFICATION};
use jetton_airdrop::transfer::{
    CallerId, ConfirmationResult, KernelConfig, PollerConfig, TransferCoordinator,
    TransferKernel, TransferOutcome,
};
use jetton_airdrop::wallet::key_pair_from_phrase;
use jetton_airdrop::{Destination, WalletSession, WalletVersion};

const FEE: u128 = 800_000_000;
const AMOUNT: u128 = 100_000_000_000;

const PHRASE: &str = "fancy carpet hello mandate penalty trial consider property top vicious \
    exit rebuild tragic profit urban major total month holiday sudden rib gather media vicious";
const PHRASE_V3R2: &str = "EQA-RswW9QONn88ziVm4UKnwXDEot5km7GEEXsfie_0TFOCO";

fn keys() -> KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| key_pair_from_phrase(PHRASE).unwrap())
        .clone()
}

/// In-memory chain: confirms every broadcast jetton transfer on the next read
struct FakeChain {
    balance: u128,
    confirm: bool,
    seqno: Option<u32>,
    broadcasts: Mutex<Vec<u64>>,
    seqno_reads: AtomicUsize,
    history_reads: AtomicUsize,
}

impl FakeChain {
    fn new(balance: u128, confirm: bool) -> Self {
        Self {
            balance,
            confirm,
            seqno: Some(7),
            broadcasts: Mutex::new(Vec::new()),
            seqno_reads: AtomicUsize::new(0),
            history_reads: AtomicUsize::new(0),
        }
    }
}

fn jetton_query_id(external: &[u8]) -> u64 {
    let ext = Message::from_boc(external).unwrap();
    let internal = Message::from_cell(&ext.body.value.references()[0]).unwrap();
    let mut payload = internal.body.value.parser();
    assert_eq!(payload.load_u32(32).unwrap(), OP_TRANSFER);
    payload.load_u64(64).unwrap()
}

#[async_trait]
impl LedgerClient for FakeChain {
    async fn get_balance(&self, _: &TonAddress) -> Result<u128, LedgerError> {
        Ok(self.balance)
    }

    async fn get_seqno(&self, _: &TonAddress) -> Result<Option<u32>, LedgerError> {
        self.seqno_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.seqno)
    }

    async fn get_transactions(
        &self,
        _: &TonAddress,
        _: u32,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        self.history_reads.fetch_add(1, Ordering::SeqCst);
        if !self.confirm {
            return Ok(vec![]);
        }
        let sent = self.broadcasts.lock().unwrap().clone();
        Ok(sent
            .into_iter()
            .rev()
            .map(|query_id| {
                let body = CellBuilder::new()
                    .store_u32(32, OP_TRANSFER_NOTIFICATION)
                    .unwrap()
                    .store_u64(64, query_id)
                    .unwrap()
                    .build()
                    .unwrap();
                LedgerTransaction {
                    lt: query_id.to_string(),
                    hash: format!("tx/{}+hash=", query_id),
                    in_msg_body: Some(body.to_boc_b64(true).unwrap()),
                }
            })
            .collect())
    }

    async fn send_boc(&self, boc_bytes: &[u8]) -> Result<(), LedgerError> {
        self.broadcasts
            .lock()
            .unwrap()
            .push(jetton_query_id(boc_bytes));
        Ok(())
    }
}

#[derive(Default)]
struct Inbox {
    messages: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Notifier for Inbox {
    async fn send(&self, caller: &CallerId, message: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .unwrap()
            .push((caller.as_str().to_string(), message.to_string()));
        Ok(())
    }
}

struct Service {
    kernel: Arc<TransferKernel>,
    chain: Arc<FakeChain>,
    inbox: Arc<Inbox>,
    coordinator: Arc<TransferCoordinator>,
}

fn service(chain: FakeChain, poller: PollerConfig) -> Service {
    let chain = Arc::new(chain);
    let session =
        WalletSession::with_key_pair(keys(), WalletVersion::V3R2, 0, chain.clone()).unwrap();
    let inbox = Arc::new(Inbox::default());
    let coordinator = TransferCoordinator::new();
    let jetton_wallet = TonAddress::new(0, TonHash::from([0x5a; 32]));
    let mut config = KernelConfig::new(
        Destination::parse(&jetton_wallet.to_hex()).unwrap(),
        Network::Mainnet,
    );
    config.poller = poller;
    let kernel = Arc::new(TransferKernel::new(
        Arc::new(session),
        coordinator.clone(),
        inbox.clone(),
        config,
    ));
    Service {
        kernel,
        chain,
        inbox,
        coordinator,
    }
}

fn poller(max_attempts: u32) -> PollerConfig {
    PollerConfig {
        max_attempts,
        interval_ms: 0,
        tx_limit: 10,
    }
}

fn recipient() -> String {
    TonAddress::new(0, TonHash::from([0x11; 32])).to_base64_url_flags(true, false)
}

#[test]
fn phrase_alone_fixes_wallet_address() {
    let chain = Arc::new(FakeChain::new(0, false));
    let session = WalletSession::init(PHRASE, WalletVersion::V3R2, 0, chain).unwrap();
    assert_eq!(session.address().to_base64_url(), PHRASE_V3R2);
}

#[tokio::test]
async fn http_request_dispatches_and_settles() {
    let svc = service(FakeChain::new(FEE * 2, true), poller(5));
    let state = Arc::new(AppState::new(
        svc.kernel.clone(),
        AMOUNT,
        PathBuf::from("public"),
    ));

    let req = JettonTransferRequest {
        dest: Some(recipient()),
        chat_id: Some(serde_json::json!(555)),
    };
    assert_eq!(jetton_transfer(State(state), Json(req)).await, "ok");

    // settlement runs in the background; wait for the channel to free up
    for _ in 0..200 {
        if !svc.coordinator.is_held("transfer") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert!(!svc.coordinator.is_held("transfer"));

    let query_id = svc.chain.broadcasts.lock().unwrap()[0];
    let messages = svc.inbox.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].0, "555");
    assert_eq!(messages[0].1, format!("Sending jetton to {}", recipient()));
    assert_eq!(
        messages[1].1,
        format!(
            "Successfully sent \nlink: https://tonviewer.com/transaction/tx_{}-hash=",
            query_id
        )
    );
}

#[tokio::test]
async fn second_caller_is_turned_away_while_first_settles() {
    let svc = service(FakeChain::new(FEE * 10, false), poller(3));
    let caller = CallerId::new("1");

    let first = svc.kernel.transfer(&recipient(), AMOUNT, &caller).await;
    let second = svc.kernel.transfer(&recipient(), AMOUNT, &caller).await;
    assert_eq!(second.reply(), "service is busy");

    let TransferOutcome::Dispatched(dispatch) = first else {
        panic!("first transfer should dispatch");
    };
    assert_eq!(
        dispatch.settlement.await.unwrap(),
        ConfirmationResult::Exhausted { attempts: 3 }
    );
    assert_eq!(svc.chain.history_reads.load(Ordering::SeqCst), 3);
    assert_eq!(svc.chain.broadcasts.lock().unwrap().len(), 1);

    // channel released after exhaustion, next transfer goes through
    let third = svc.kernel.transfer(&recipient(), AMOUNT, &caller).await;
    assert!(third.is_dispatched());
}

#[tokio::test]
async fn rejected_requests_never_broadcast() {
    let svc = service(FakeChain::new(FEE, true), poller(1));
    let caller = CallerId::new("2");

    assert_eq!(
        svc.kernel.transfer("garbage", AMOUNT, &caller).await.reply(),
        "invalid address"
    );
    assert_eq!(
        svc.kernel.transfer(&recipient(), AMOUNT, &caller).await.reply(),
        "not enough balance"
    );
    assert!(svc.chain.broadcasts.lock().unwrap().is_empty());
    assert!(!svc.coordinator.is_held("transfer"));
}

#[tokio::test]
async fn undeployed_wallet_sends_first_transfer_with_seqno_zero() {
    let mut chain = FakeChain::new(FEE * 2, true);
    chain.seqno = None;
    let svc = service(chain, poller(2));

    let outcome = svc
        .kernel
        .transfer(&recipient(), AMOUNT, &CallerId::new("3"))
        .await;
    let TransferOutcome::Dispatched(dispatch) = outcome else {
        panic!("expected dispatch");
    };
    assert!(matches!(
        dispatch.settlement.await.unwrap(),
        ConfirmationResult::Matched { attempts: 1, .. }
    ));
}

#[tokio::test]
async fn http_and_bot_share_one_channel() {
    let svc = service(
        FakeChain::new(FEE * 10, false),
        PollerConfig {
            max_attempts: 50,
            interval_ms: 20,
            tx_limit: 10,
        },
    );
    let state = Arc::new(AppState::new(
        svc.kernel.clone(),
        AMOUNT,
        PathBuf::from("public"),
    ));
    let bot = CommandHandler::new(svc.kernel.clone(), AMOUNT, String::new());

    let req = JettonTransferRequest {
        dest: Some(recipient()),
        chat_id: Some(serde_json::json!(7)),
    };
    assert_eq!(jetton_transfer(State(state), Json(req)).await, "ok");
    assert_eq!(svc.chain.seqno_reads.load(Ordering::SeqCst), 1);

    // HTTP transfer is still unconfirmed: the bot is turned away before any read
    let actions = bot.handle(8, &format!("/send {}", recipient())).await;
    assert_eq!(
        actions,
        vec![BotAction::Reply("service is busy".to_string())]
    );
    assert_eq!(svc.chain.seqno_reads.load(Ordering::SeqCst), 1);
    assert_eq!(svc.chain.broadcasts.lock().unwrap().len(), 1);
    assert!(svc.coordinator.is_held("transfer"));
}
