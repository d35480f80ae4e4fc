//! Caller-facing entry point: issue a correlated request and await its
//! settlement.

use crate::config::BridgeConfig;
use crate::domain::{CallError, CallReply, CorrelatedMessage, PendingCallStore, PendingStats};
use crate::readiness::ReadinessGate;
use shared_bus::{BusPublisher, BusRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Issues logical RPCs over the bus.
///
/// One dispatcher is shared by every call site in the process; it holds
/// handles to the pending-call table and the readiness gate, both owned
/// by the bridge that created it.
///
/// Guarantee: exactly one settlement per call. The pending entry is
/// removed atomically with settlement, so a late duplicate never
/// double-fires; the timeout path and the resolve path race safely,
/// whichever runs first wins and the loser is a no-op.
#[derive(Clone)]
pub struct RequestDispatcher {
    bus: Arc<dyn BusPublisher>,
    pending: Arc<PendingCallStore>,
    gate: Arc<ReadinessGate>,
    config: BridgeConfig,
}

impl RequestDispatcher {
    /// Create a dispatcher over an existing pending table and gate.
    ///
    /// Most code should go through `Bridge::start`, which wires these
    /// and flips the gate once the correlator is live.
    pub fn new(
        bus: Arc<dyn BusPublisher>,
        pending: Arc<PendingCallStore>,
        gate: Arc<ReadinessGate>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            bus,
            pending,
            gate,
            config,
        }
    }

    /// Issue a call: publish `payload` to `request_topic` and await the
    /// correlated response.
    ///
    /// The payload must be a JSON object; the freshly minted correlation
    /// id is merged into it on the wire. `timeout` falls back to the
    /// configured default (the supported band is on the order of 10-30s).
    ///
    /// # Errors
    ///
    /// - [`CallError::NotReady`] - the response consumer never became
    ///   ready within the wait budget; nothing was published.
    /// - [`CallError::PublishFailed`] - transport-level send error,
    ///   surfaced immediately, never retried here.
    /// - [`CallError::Timeout`] - no matching response within the
    ///   deadline; the pending entry is gone and a late response for
    ///   this id is a no-op.
    ///
    /// A handler-reported business failure is NOT an error: it settles
    /// as [`CallReply::BusinessFailure`].
    pub async fn call(
        &self,
        request_topic: &str,
        payload: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<CallReply, CallError> {
        let timeout = timeout.unwrap_or(self.config.default_call_timeout);

        // A call issued before the consumer loop is subscribed would be
        // unanswerable (no replay for late subscribers), so the gate
        // comes first and failing it means nothing was sent.
        if !self.gate.wait_ready(self.config.readiness_wait).await {
            return Err(CallError::NotReady {
                waited: self.config.readiness_wait,
            });
        }

        // Register before publishing: the entry must exist by the time
        // any response can arrive.
        let (correlation_id, rx) = self.pending.register(request_topic, timeout);

        let envelope = CorrelatedMessage::new(correlation_id, payload);
        let bytes = match envelope.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.pending.cancel(&correlation_id, false);
                return Err(CallError::Encode(e));
            }
        };

        let record = BusRecord {
            topic: request_topic.to_string(),
            key: Some(correlation_id.to_string()),
            payload: bytes,
        };

        if let Err(e) = self.bus.publish(record).await {
            self.pending.cancel(&correlation_id, false);
            return Err(CallError::PublishFailed {
                topic: request_topic.to_string(),
                source: e,
            });
        }

        debug!(
            correlation_id = %correlation_id,
            request_topic = request_topic,
            timeout_ms = timeout.as_millis(),
            "Published correlated request"
        );

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(settlement)) => Ok(CallReply::from_settlement(settlement)),
            Ok(Err(_)) => {
                // The entry was removed without settling (the expiry
                // sweeper got there first); to the caller that is a
                // timeout.
                Err(CallError::Timeout {
                    request_topic: request_topic.to_string(),
                    timeout,
                })
            }
            Err(_) => {
                // Deadline fired before a response matched. Removing the
                // entry here is what makes a late response a no-op.
                self.pending.cancel(&correlation_id, true);
                Err(CallError::Timeout {
                    request_topic: request_topic.to_string(),
                    timeout,
                })
            }
        }
    }

    /// Number of calls currently awaiting settlement.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    /// Counters over the per-call state machine.
    #[must_use]
    pub fn stats(&self) -> &PendingStats {
        self.pending.stats()
    }
}
