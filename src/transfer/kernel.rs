//! Transfer Kernel
//!
//! Single entry point shared by every front end:
//!
//! ```text
//! validate dest -> acquire channel -> balance check -> encode -> sign+broadcast
//!   -> [spawned] notify "Sending" -> poll -> notify result -> release channel
//! ```
//!
//! The channel guard is held from acquisition until the settlement task has
//! notified the caller, so seqno reads never interleave. Notifications never
//! run on the caller's path: a slow chat API only delays the background task.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::confirmation::{ConfirmationPoller, ConfirmationResult, PollerConfig};
use super::coordinator::{ChannelGuard, TRANSFER_CHANNEL, TransferCoordinator};
use super::error::TransferError;
use super::jetton::{self, DEFAULT_FORWARD_AMOUNT, JettonTransfer};
use super::query_id::QueryIdGenerator;
use super::types::{CallerId, Destination, Dispatch, TransferOutcome, TransferRequest};
use crate::ledger::Network;
use crate::money::format_amount;
use crate::notify::Notifier;
use crate::wallet::WalletSession;

/// 0.8 TON attached to the jetton wallet call
pub const DEFAULT_TRANSFER_FEE: u128 = 800_000_000;

#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Service's own jetton wallet (receives the transfer request)
    pub jetton_wallet: Destination,
    /// Used for log output only
    pub jetton_decimals: u32,
    /// Nanotons attached to the request; also the balance reserve
    pub transfer_fee: u128,
    pub forward_ton_amount: u128,
    pub forward_payload: Vec<u8>,
    pub network: Network,
    pub poller: PollerConfig,
}

impl KernelConfig {
    pub fn new(jetton_wallet: Destination, network: Network) -> Self {
        Self {
            jetton_wallet,
            jetton_decimals: 9,
            transfer_fee: DEFAULT_TRANSFER_FEE,
            forward_ton_amount: DEFAULT_FORWARD_AMOUNT,
            forward_payload: Vec::new(),
            network,
            poller: PollerConfig::default(),
        }
    }
}

pub struct TransferKernel {
    session: Arc<WalletSession>,
    coordinator: Arc<TransferCoordinator>,
    notifier: Arc<dyn Notifier>,
    query_ids: QueryIdGenerator,
    config: KernelConfig,
}

impl TransferKernel {
    pub fn new(
        session: Arc<WalletSession>,
        coordinator: Arc<TransferCoordinator>,
        notifier: Arc<dyn Notifier>,
        config: KernelConfig,
    ) -> Self {
        Self {
            session,
            coordinator,
            notifier,
            query_ids: QueryIdGenerator::new(),
            config,
        }
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    pub async fn transfer(&self, dest: &str, amount: u128, caller: &CallerId) -> TransferOutcome {
        match self.try_transfer(dest, amount, caller).await {
            Ok(dispatch) => TransferOutcome::Dispatched(dispatch),
            Err(e) => {
                info!(dest, code = e.code(), error = %e, "Transfer rejected");
                TransferOutcome::Rejected(e)
            }
        }
    }

    async fn try_transfer(
        &self,
        dest: &str,
        amount: u128,
        caller: &CallerId,
    ) -> Result<Dispatch, TransferError> {
        let destination = Destination::parse(dest)
            .map_err(|e| TransferError::InvalidDestination(e.to_string()))?;

        let guard = self.coordinator.try_acquire(TRANSFER_CHANNEL)?;

        // Dropping `guard` on any early return releases the channel
        if !self.session.check_balance_enough(self.config.transfer_fee).await? {
            return Err(TransferError::InsufficientBalance);
        }

        let request = TransferRequest {
            destination,
            amount,
            query_id: self.query_ids.next(),
        };
        let payload = jetton::encode(&JettonTransfer {
            query_id: request.query_id.value(),
            amount: request.amount,
            destination: request.destination.address.clone(),
            response_destination: self.session.address().clone(),
            forward_ton_amount: self.config.forward_ton_amount,
            forward_payload: self.config.forward_payload.clone(),
        })?;

        let jetton_wallet = &self.config.jetton_wallet;
        if let Err(e) = self
            .session
            .sign_and_broadcast(
                &jetton_wallet.address,
                jetton_wallet.bounceable,
                self.config.transfer_fee,
                payload,
            )
            .await
        {
            let err = TransferError::BroadcastFailure(e.to_string());
            error!(query_id = %request.query_id, dest, error = %e, "Broadcast failed");
            let notifier = self.notifier.clone();
            let caller = caller.clone();
            let reply = err.reply();
            tokio::spawn(async move { notify(notifier.as_ref(), &caller, reply).await });
            return Err(err);
        }

        info!(
            query_id = %request.query_id,
            dest,
            amount = %format_amount(amount, self.config.jetton_decimals),
            "Jetton transfer dispatched"
        );

        let query_id = request.query_id;
        let settlement = tokio::spawn(settle(
            ConfirmationPoller::new(self.session.ledger().clone(), self.config.poller.clone()),
            self.notifier.clone(),
            self.config.network,
            request,
            caller.clone(),
            dest.to_string(),
            guard,
        ));

        Ok(Dispatch {
            query_id,
            settlement,
        })
    }
}

async fn notify(notifier: &dyn Notifier, caller: &CallerId, message: &str) {
    if let Err(e) = notifier.send(caller, message).await {
        warn!(caller = %caller, error = %e, "Failed to notify caller");
    }
}

/// Background half of a transfer: announce, poll, report, release.
/// `dest` is the address exactly as the caller typed it.
async fn settle(
    poller: ConfirmationPoller,
    notifier: Arc<dyn Notifier>,
    network: Network,
    request: TransferRequest,
    caller: CallerId,
    dest: String,
    guard: ChannelGuard,
) -> ConfirmationResult {
    notify(
        notifier.as_ref(),
        &caller,
        &format!("Sending jetton to {}", dest),
    )
    .await;

    let result = poller
        .poll(&request.destination.address, request.query_id)
        .await;

    match &result {
        ConfirmationResult::Matched { tx_hash, .. } => {
            let url = network.explorer_tx_url(tx_hash);
            info!(query_id = %request.query_id, tx_hash = %tx_hash, "transaction hash");
            notify(
                notifier.as_ref(),
                &caller,
                &format!("Successfully sent \nlink: {}", url),
            )
            .await;
        }
        ConfirmationResult::Exhausted { attempts } => {
            let err = TransferError::ConfirmationTimeout {
                attempts: *attempts,
            };
            warn!(query_id = %request.query_id, code = err.code(), "Transfer unconfirmed");
            notify(
                notifier.as_ref(),
                &caller,
                &format!(
                    "Transfer to {} could not be confirmed, check the explorer later",
                    request.destination
                ),
            )
            .await;
        }
    }

    guard.release();
    result
}
