//! Transfer Coordinator
//!
//! Named-channel mutual exclusion. At most one transfer holds a channel at a
//! time; a second caller is turned away with `Busy` instead of waiting.
//!
//! The returned [`ChannelGuard`] releases the channel exactly once, either
//! through [`ChannelGuard::release`] or when dropped.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::error::TransferError;

/// Channel shared by every front end
pub const TRANSFER_CHANNEL: &str = "transfer";

#[derive(Debug, Default)]
pub struct TransferCoordinator {
    held: DashMap<String, ()>,
}

impl TransferCoordinator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Acquire `channel` or fail immediately with `Busy`
    pub fn try_acquire(self: &Arc<Self>, channel: &str) -> Result<ChannelGuard, TransferError> {
        match self.held.entry(channel.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                debug!(channel, "Channel busy");
                Err(TransferError::Busy)
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
                debug!(channel, "Channel acquired");
                Ok(ChannelGuard {
                    coordinator: Arc::clone(self),
                    channel: channel.to_string(),
                    released: false,
                })
            }
        }
    }

    pub fn is_held(&self, channel: &str) -> bool {
        self.held.contains_key(channel)
    }

    fn release(&self, channel: &str) {
        self.held.remove(channel);
        debug!(channel, "Channel released");
    }
}

#[derive(Debug)]
pub struct ChannelGuard {
    coordinator: Arc<TransferCoordinator>,
    channel: String,
    released: bool,
}

impl ChannelGuard {
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.coordinator.release(&self.channel);
        }
    }
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}
