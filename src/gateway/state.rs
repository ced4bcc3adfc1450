use std::path::PathBuf;
use std::sync::Arc;

use crate::transfer::TransferKernel;

/// Shared gateway state
pub struct AppState {
    pub kernel: Arc<TransferKernel>,
    /// Jetton amount per request, smallest units
    pub transfer_amount: u128,
    /// Directory holding `index.html`
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(kernel: Arc<TransferKernel>, transfer_amount: u128, public_dir: PathBuf) -> Self {
        Self {
            kernel,
            transfer_amount,
            public_dir,
        }
    }
}
