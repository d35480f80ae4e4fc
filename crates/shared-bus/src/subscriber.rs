//! # Bus Subscriber
//!
//! Defines the subscription side of the bus.

use crate::record::BusRecord;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("bus closed")]
    Closed,
}

/// Trait for subscribing to records from the bus.
pub trait BusSubscriber: Send + Sync {
    /// Subscribe to a fixed set of topics.
    fn subscribe(&self, topics: &[&str]) -> Subscription;
}

impl BusSubscriber for crate::publisher::InMemoryBus {
    fn subscribe(&self, topics: &[&str]) -> Subscription {
        crate::publisher::InMemoryBus::subscribe(self, topics)
    }
}

/// A subscription handle for receiving records on a fixed topic set.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<BusRecord>,

    /// Topics this subscription yields.
    topics: Vec<String>,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Topic key for this subscription.
    topic_key: String,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        receiver: broadcast::Receiver<BusRecord>,
        topics: Vec<String>,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        topic_key: String,
    ) -> Self {
        Self {
            receiver,
            topics,
            subscriptions,
            topic_key,
        }
    }

    /// Receive the next record on one of the subscribed topics.
    ///
    /// # Returns
    ///
    /// - `Some(record)` - The next matching record
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<BusRecord> {
        loop {
            let record = match self.receiver.recv().await {
                Ok(r) => r,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some records dropped");
                    continue;
                }
            };

            if self.matches(&record) {
                return Some(record);
            }
            // Record is for another topic, keep waiting
        }
    }

    /// Try to receive the next matching record without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::Closed`] when the bus is gone.
    pub fn try_recv(&mut self) -> Result<Option<BusRecord>, SubscriptionError> {
        loop {
            let record = match self.receiver.try_recv() {
                Ok(r) => r,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.matches(&record) {
                return Ok(Some(record));
            }
        }
    }

    /// Topics this subscription yields.
    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    fn matches(&self, record: &BusRecord) -> bool {
        self.topics.iter().any(|t| *t == record.topic)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Decrement subscription count
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.topic_key) else {
            debug!(topics = %self.topic_key, "Subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.topic_key);
        }
        debug!(topics = %self.topic_key, "Subscription dropped");
    }
}
