//! Pending-call table - the async-to-sync bridge.
//!
//! Maps correlation IDs to waiting callers until the correlator settles
//! them or their deadline expires.

use crate::domain::correlation::CorrelationId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A pending call waiting for its correlated response.
///
/// Lives from `register` to exactly one terminal transition: resolved by
/// a matching response, or expired by timeout.
struct PendingCall {
    /// Channel that settles the caller with the full response payload.
    sender: oneshot::Sender<serde_json::Value>,
    /// When the call was registered.
    created_at: Instant,
    /// Request topic (for logging).
    request_topic: String,
    /// Deadline budget for this call.
    timeout: Duration,
}

/// Counters over the per-call state machine
/// (`SENT -> AWAITING -> {RESOLVED | TIMED_OUT}`).
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Calls registered.
    pub total_registered: AtomicU64,
    /// Calls resolved by a matching response.
    pub total_resolved: AtomicU64,
    /// Calls expired by timeout.
    pub total_timeouts: AtomicU64,
    /// Calls whose caller went away before settlement.
    pub total_cancelled: AtomicU64,
}

/// The pending-call table.
///
/// Flow:
/// 1. Dispatcher calls `register()` to get a correlation id and a receiver
/// 2. Dispatcher publishes the request carrying the correlation id
/// 3. Correlator receives the response and calls `resolve()`
/// 4. Dispatcher awaits the receiver or times out and calls `cancel()`
///
/// Settlement is removal: whichever of resolve/cancel removes the entry
/// first wins, the loser finds nothing and is a no-op. At most one entry
/// per correlation id exists at any instant.
pub struct PendingCallStore {
    /// Map of correlation ID to pending call.
    pending: DashMap<CorrelationId, PendingCall>,
    /// Statistics.
    stats: Arc<PendingStats>,
}

impl PendingCallStore {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending call and get a receiver for its settlement.
    ///
    /// Returns the freshly minted correlation ID and the receiver the
    /// dispatcher awaits.
    pub fn register(
        &self,
        request_topic: &str,
        timeout: Duration,
    ) -> (CorrelationId, oneshot::Receiver<serde_json::Value>) {
        let correlation_id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();

        let call = PendingCall {
            sender: tx,
            created_at: Instant::now(),
            request_topic: request_topic.to_string(),
            timeout,
        };

        self.pending.insert(correlation_id, call);
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = %correlation_id,
            request_topic = request_topic,
            "Registered pending call"
        );

        (correlation_id, rx)
    }

    /// Settle a pending call with its response payload.
    ///
    /// Removal and settlement are one atomic step. Returns true if the
    /// call was found and resolved; false for unknown, already-settled,
    /// or already-expired ids (the response is then dropped silently).
    pub fn resolve(&self, correlation_id: CorrelationId, payload: serde_json::Value) -> bool {
        let Some((_, call)) = self.pending.remove(&correlation_id) else {
            debug!(
                correlation_id = %correlation_id,
                "Response for unknown or expired correlation ID, dropped"
            );
            return false;
        };

        let elapsed = call.created_at.elapsed();
        match call.sender.send(payload) {
            Ok(()) => {
                self.stats.total_resolved.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    request_topic = call.request_topic,
                    elapsed_ms = elapsed.as_millis(),
                    "Resolved pending call"
                );
                true
            }
            Err(_) => {
                // Receiver was dropped (caller gave up)
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    request_topic = call.request_topic,
                    "Pending call receiver dropped before settlement"
                );
                false
            }
        }
    }

    /// Remove a pending call without settling it.
    ///
    /// The dispatcher's timeout path and the send-failure path both land
    /// here. Returns false when the entry is already gone.
    pub fn cancel(&self, correlation_id: &CorrelationId, timed_out: bool) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            if timed_out {
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
            } else {
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            }
            true
        } else {
            false
        }
    }

    /// Remove entries whose deadline passed while their caller was gone.
    ///
    /// The dispatcher normally cancels its own entry on timeout; this
    /// sweep catches callers whose future was dropped mid-wait so the
    /// table can never leak past a deadline. Returns the number removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, call| {
            let elapsed = now.duration_since(call.created_at);
            if elapsed > call.timeout {
                warn!(
                    correlation_id = %id,
                    request_topic = call.request_topic,
                    elapsed_ms = elapsed.as_millis(),
                    timeout_ms = call.timeout.as_millis(),
                    "Removing expired pending call"
                );
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false // Remove
            } else {
                true // Keep
            }
        });

        removed
    }

    /// Number of currently pending calls.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending.
    #[must_use]
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

impl Default for PendingCallStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task that sweeps expired entries.
pub async fn cleanup_task(store: Arc<PendingCallStore>, interval: Duration) {
    let mut sweep = tokio::time::interval(interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep.tick().await;
        let removed = store.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Swept expired pending calls");
        }
    }
}
