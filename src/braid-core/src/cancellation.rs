//! Cooperative cancellation.
//!
//! A single [`CancellationHandle`] signals every partition of a query. Scan
//! loops observe the signal only at poll points: each loop keeps an
//! iteration counter and checks the token whenever
//! `counter & POLL_INTERVAL == 0`.

use std::sync::Arc;

use common_error::{BraidError, BraidResult};
use tokio::sync::watch;

/// Mask applied to scan-loop iteration counters (a power of two minus one).
pub const POLL_INTERVAL: usize = 63;

/// Handle for cancelling query execution.
///
/// This handle is separate from the tokens handed to enumerators and can be
/// used to signal cancellation from outside the query.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl CancellationHandle {
    /// Create a new cancellation handle and a token observing it.
    pub fn new() -> (Self, CancellationToken) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel_tx: Arc::new(tx),
            },
            CancellationToken { cancel_rx: rx },
        )
    }

    /// Cancel the query.
    pub fn cancel(&self) {
        // send_replace stores the flag even when no token is alive yet.
        self.cancel_tx.send_replace(true);
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Create another token observing this handle.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            cancel_rx: self.cancel_tx.subscribe(),
        }
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new().0
    }
}

/// Read side of a [`CancellationHandle`], cloned into every enumerator.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancel_rx: watch::Receiver<bool>,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn none() -> Self {
        let (_, rx) = watch::channel(false);
        Self { cancel_rx: rx }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Fail with [`BraidError::Cancelled`] if cancellation has been requested.
    pub fn check(&self) -> BraidResult<()> {
        if self.is_cancelled() {
            Err(BraidError::cancelled("query execution cancelled"))
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::none()
    }
}
