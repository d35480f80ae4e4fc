//! Readiness gate for the shared response consumer.
//!
//! Subscribing and starting the consumption loop is itself asynchronous;
//! publishing before the subscriptions are active risks an unanswerable
//! call, because the bus offers no replay to late subscribers. The gate
//! is a one-shot boolean that flips exactly once, after connect +
//! subscribe(all fixed topics) + loop-start all succeed. Waiters attach
//! to a watch channel - no polling, and no race window between flag-check
//! and flag-set.

use std::time::Duration;
use tokio::sync::watch;

/// One-shot readiness signal with a monotonic false->true transition.
#[derive(Debug)]
pub struct ReadinessGate {
    tx: watch::Sender<bool>,
}

impl ReadinessGate {
    /// Create a gate in the not-ready state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Flip the gate. Idempotent; the gate never flips back.
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    /// Current state without waiting.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspend until the gate is ready, up to `bound`.
    ///
    /// Returns false when the bound elapses first. Already-ready gates
    /// return true immediately.
    pub async fn wait_ready(&self, bound: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        let result = match tokio::time::timeout(bound, rx.wait_for(|ready| *ready)).await {
            Ok(Ok(_)) => true,
            // Channel-closed cannot happen while `self` holds the sender;
            // treat it like an elapsed bound if it ever does.
            Ok(Err(_)) | Err(_) => false,
        };
        result
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
