//! Wallet Session
//!
//! Holds the service wallet's keys and issues signed transfers. A session is
//! only obtainable through [`WalletSession::init`] (or
//! [`WalletSession::with_key_pair`]), so a live session always has a keypair
//! and an address.
//!
//! Contract code, data layout, signing and the external envelope come from
//! `tonlib-core`; this module only adds the internal message and the ledger
//! round trips.
//!
//! ```text
//! ext_in_msg_info$10 src:addr_none dest:wallet import_fee:0
//!   init:(Maybe StateInit)          -- only while seqno == 0
//!   body:[signature:bits512 subwallet_id valid_until seqno [op] mode ^internal]
//!
//! int_msg_info$0 ihr_disabled:1 bounce bounced:0 src:addr_none dest value
//!   ihr_fee:0 fwd_fee:0 created_lt:0 created_at:0 init:0 body:^payload
//! ```

pub mod error;
pub mod version;

pub use error::WalletError;
pub use version::WalletVersion;

use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;
use tonlib_core::TonAddress;
use tonlib_core::cell::{ArcCell, BagOfCells, Cell, TonCellError};
use tonlib_core::tlb_types::block::coins::{CurrencyCollection, Grams};
use tonlib_core::tlb_types::block::message::{CommonMsgInfo, IntMsgInfo, Message};
use tonlib_core::tlb_types::block::msg_address::MsgAddress;
use tonlib_core::tlb_types::primitives::either::EitherRefLayout;
use tonlib_core::tlb_types::tlb::TLB;
use tonlib_core::wallet::mnemonic::{KeyPair, Mnemonic};
use tonlib_core::wallet::ton_wallet::TonWallet;
use tonlib_core::wallet::versioned::DEFAULT_WALLET_ID;
use tracing::{debug, info};

use crate::ledger::LedgerClient;

/// Validity window of a signed message
pub const MESSAGE_TTL_SECS: u32 = 60;

/// Broadcast acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastAck {
    pub seqno: u32,
    pub valid_until: u32,
    /// Hex representation hash of the external message
    pub message_hash: String,
}

/// 24-word TON phrase, no password
pub fn key_pair_from_phrase(phrase: &str) -> Result<KeyPair, WalletError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let mnemonic = Mnemonic::new(words, &None)?;
    Ok(mnemonic.to_key_pair()?)
}

pub struct WalletSession {
    wallet: TonWallet,
    version: WalletVersion,
    ledger: Arc<dyn LedgerClient>,
}

impl WalletSession {
    /// Validate the phrase, derive keys and the contract address
    pub fn init(
        secret_phrase: &str,
        version: WalletVersion,
        workchain: i8,
        ledger: Arc<dyn LedgerClient>,
    ) -> Result<Self, WalletError> {
        let key_pair = key_pair_from_phrase(secret_phrase)?;
        Self::with_key_pair(key_pair, version, workchain, ledger)
    }

    /// Subwallet id is the default id shifted by the workchain
    pub fn with_key_pair(
        key_pair: KeyPair,
        version: WalletVersion,
        workchain: i8,
        ledger: Arc<dyn LedgerClient>,
    ) -> Result<Self, WalletError> {
        let wallet_id = DEFAULT_WALLET_ID.wrapping_add(i32::from(workchain));
        let wallet = TonWallet::new_with_params(
            version.contract(),
            key_pair,
            i32::from(workchain),
            wallet_id,
        )?;

        let session = Self {
            wallet,
            version,
            ledger,
        };
        info!(
            address = %session.display_address(),
            version = version.as_str(),
            "Wallet session initialized"
        );
        Ok(session)
    }

    #[inline]
    pub fn address(&self) -> &TonAddress {
        &self.wallet.address
    }

    /// Url-safe, non-bounceable form
    pub fn display_address(&self) -> String {
        self.wallet.address.to_base64_url_flags(true, false)
    }

    #[inline]
    pub fn public_key(&self) -> &[u8] {
        &self.wallet.key_pair.public_key
    }

    #[inline]
    pub fn version(&self) -> WalletVersion {
        self.version
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    /// Balance in nanotons
    pub async fn balance(&self) -> Result<u128, WalletError> {
        Ok(self.ledger.get_balance(self.address()).await?)
    }

    /// True iff balance is strictly greater than `reserve_fee`
    pub async fn check_balance_enough(&self, reserve_fee: u128) -> Result<bool, WalletError> {
        let balance = self.balance().await?;
        debug!(balance, reserve_fee, "Balance check");
        Ok(balance > reserve_fee)
    }

    /// Fresh seqno read; an undeployed wallet reports 0
    pub async fn next_sequence_number(&self) -> Result<u32, WalletError> {
        Ok(self.ledger.get_seqno(self.address()).await?.unwrap_or(0))
    }

    /// Build the signed external message. No I/O.
    pub fn build_transfer(
        &self,
        seqno: u32,
        valid_until: u32,
        destination: &TonAddress,
        bounce: bool,
        amount: u128,
        payload: ArcCell,
    ) -> Result<Cell, WalletError> {
        let internal = internal_message(destination, bounce, amount, payload)?.to_arc();
        Ok(self
            .wallet
            .create_external_msg(valid_until, seqno, seqno == 0, [internal])?)
    }

    /// Read seqno, sign and submit. Returns once the ledger accepted the BOC.
    pub async fn sign_and_broadcast(
        &self,
        destination: &TonAddress,
        bounce: bool,
        attached_amount: u128,
        payload: Cell,
    ) -> Result<BroadcastAck, WalletError> {
        let seqno = self.next_sequence_number().await?;
        let valid_until = valid_until(seqno, chrono::Utc::now().timestamp());

        let message = self.build_transfer(
            seqno,
            valid_until,
            destination,
            bounce,
            attached_amount,
            payload.to_arc(),
        )?;
        let message_hash = message.cell_hash().to_hex();
        let boc = BagOfCells::from_root(message).serialize(true)?;
        self.ledger.send_boc(&boc).await?;

        info!(seqno, dest = %destination, message_hash = %message_hash, "Transfer broadcast");
        Ok(BroadcastAck {
            seqno,
            valid_until,
            message_hash,
        })
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.display_address())
            .field("version", &self.version)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// First message of an undeployed wallet never expires
fn valid_until(seqno: u32, now_secs: i64) -> u32 {
    if seqno == 0 {
        u32::MAX
    } else {
        (now_secs.max(0) as u64 + MESSAGE_TTL_SECS as u64).min(u32::MAX as u64) as u32
    }
}

fn internal_message(
    destination: &TonAddress,
    bounce: bool,
    amount: u128,
    payload: ArcCell,
) -> Result<Cell, TonCellError> {
    let info = CommonMsgInfo::Int(IntMsgInfo {
        ihr_disabled: true,
        bounce,
        bounced: false,
        src: MsgAddress::NONE,
        dest: destination.to_msg_address(),
        value: CurrencyCollection::new(BigUint::from(amount)),
        ihr_fee: Grams::new(BigUint::from(0u32)),
        fwd_fee: Grams::new(BigUint::from(0u32)),
        created_lt: 0,
        created_at: 0,
    });
    let mut message = Message::new(info, payload);
    message.body.layout = EitherRefLayout::ToRef;
    message.to_cell()
}
