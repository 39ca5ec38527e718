//! Cooperative cancellation for long-lived watch invocations.
//!
//! A watch blocks indefinitely by design; the only clean way to stop it is to
//! hand it a `CancelToken` and trigger the token from another task. Tokens are
//! cheap to clone and all clones observe the same signal.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable cancellation signal.
///
/// Once cancelled a token stays cancelled; there is no reset.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Create a new, un-cancelled token.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Non-blocking check, used at loop tops to fail fast.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation has been requested.
    ///
    /// Resolves immediately if the token is already cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow_and_update() {
            return;
        }
        // The sender lives in self, so changed() cannot fail while we wait.
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
