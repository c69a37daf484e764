//! Cooperative cancellation.
//!
//! Long loops poll a [`CancellationFlag`] between iterations and stop with
//! [`LineageError::Cancelled`] once it is raised. The CLI raises it on Ctrl+C.

use crate::core::LineageError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// A shared, clonable stop request.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once a stop was requested.
    pub fn check(&self) -> Result<(), LineageError> {
        if self.is_cancelled() { Err(LineageError::Cancelled) } else { Ok(()) }
    }

    /// Raise this flag when the process receives Ctrl+C.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn cancel_on_ctrl_c(&self) {
        let flag = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, stopping after the current item");
                    flag.cancel();
                }
                Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
            }
        });
    }
}
