//! Jetton Transfer
//!
//! Balance-gated, single-flight jetton transfers with asynchronous
//! confirmation.
//!
//! # Flow
//!
//! ```text
//! caller -> TransferKernel::transfer(dest, amount, caller)
//!             |- Rejected(InvalidDestination | Busy | InsufficientBalance
//!             |           | BroadcastFailure | Ledger | Codec)
//!             `- Dispatched { query_id, settlement }
//!                   settlement: Polling -> Matched | Exhausted
//! ```
//!
//! # Invariants
//!
//! 1. At most one transfer holds the `"transfer"` channel at any time
//! 2. The seqno read, signing and broadcast happen inside the channel
//! 3. The channel is released exactly once on every path
//! 4. Query ids are strictly increasing within the process

pub mod confirmation;
pub mod coordinator;
pub mod error;
pub mod jetton;
pub mod kernel;
pub mod query_id;
pub mod types;


pub use confirmation::{ConfirmationPoller, ConfirmationResult, PollerConfig, normalize_hash};
pub use coordinator::{ChannelGuard, TRANSFER_CHANNEL, TransferCoordinator};
pub use error::TransferError;
pub use jetton::JettonTransfer;
pub use kernel::{KernelConfig, TransferKernel};
pub use query_id::QueryIdGenerator;
pub use types::{CallerId, Dispatch, QueryId, TransferOutcome, TransferRequest};
