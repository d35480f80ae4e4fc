//! The shared response-consumption loop.
//!
//! One correlator per process, subscribed to the fixed response-topic
//! set, settling pending calls by correlation id.

use crate::domain::{CorrelatedMessage, PendingCallStore};
use shared_bus::{BusRecord, Subscription};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Matches incoming response records to outstanding calls.
///
/// The loop never stops for a bad record: a payload that fails to parse
/// (invalid JSON, missing or malformed `correlationId`) is logged and
/// dropped - invisible to callers, who surface it later as a timeout.
/// A well-formed response with an unknown id (orphan, duplicate, late,
/// or addressed to a process that has since restarted) is dropped
/// silently.
pub struct ResponseCorrelator {
    subscription: Subscription,
    pending: Arc<PendingCallStore>,
}

impl ResponseCorrelator {
    /// Create a correlator over an active subscription.
    pub fn new(subscription: Subscription, pending: Arc<PendingCallStore>) -> Self {
        Self {
            subscription,
            pending,
        }
    }

    /// Run the consumption loop until the bus closes.
    ///
    /// Spawned once by the bridge; the readiness gate flips after this
    /// task is running.
    pub async fn run(mut self) {
        info!(
            topics = ?self.subscription.topics(),
            "Response correlator started"
        );

        while let Some(record) = self.subscription.recv().await {
            self.handle_record(&record);
        }

        warn!("Bus closed, response correlator stopping");
    }

    /// Process one record; shared with tests.
    fn handle_record(&self, record: &BusRecord) {
        let envelope = match CorrelatedMessage::decode(&record.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                // Malformed response: drop without stopping the loop.
                warn!(
                    topic = %record.topic,
                    error = %e,
                    "Malformed response dropped"
                );
                return;
            }
        };

        let correlation_id = envelope.correlation_id;
        if self.pending.resolve(correlation_id, envelope.into_settlement()) {
            debug!(
                correlation_id = %correlation_id,
                topic = %record.topic,
                "Settled pending call"
            );
        }
        // Unmatched ids were already logged at debug level by the store.
    }
}
