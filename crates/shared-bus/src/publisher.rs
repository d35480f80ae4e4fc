//! # Bus Publisher
//!
//! Defines the publishing side of the bus.

use crate::record::BusRecord;
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Transport-level publish failure.
///
/// Surfaced to callers immediately; no layer below the caller retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus connection is gone.
    #[error("bus connection closed")]
    Closed,
    /// The transport rejected the record.
    #[error("publish to '{topic}' failed: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Trait for publishing records to the bus.
///
/// This is the only seam request dispatchers and handlers use to emit
/// traffic; swapping the transport means swapping this implementation.
#[async_trait]
pub trait BusPublisher: Send + Sync {
    /// Publish a record to its topic.
    ///
    /// Returns the number of active subscribers that received the record.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] on transport-level failure. Zero subscribers
    /// is not an error on an at-least-once log.
    async fn publish(&self, record: BusRecord) -> Result<usize, BusError>;

    /// Total records published through this handle.
    fn records_published(&self) -> u64;
}

/// In-memory implementation of the bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics with per-subscription topic filtering. Suitable for
/// single-process operation; distributed deployments put a broker-backed
/// adapter behind the same traits.
pub struct InMemoryBus {
    /// Broadcast sender carrying every record; subscriptions filter by topic.
    sender: broadcast::Sender<BusRecord>,

    /// Active subscription count by topic set.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total records published.
    records_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            records_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to a fixed set of topics.
    ///
    /// Returns a [`Subscription`] handle that yields only records published
    /// to those topics, starting from the moment of subscription; the bus
    /// offers no replay to late subscribers.
    #[must_use]
    pub fn subscribe(&self, topics: &[&str]) -> Subscription {
        let receiver = self.sender.subscribe();
        let topics: Vec<String> = topics.iter().map(|t| (*t).to_string()).collect();
        let topic_key = topics.join(",");

        // Track subscription
        {
            if let Ok(mut subs) = self.subscriptions.write() {
                *subs.entry(topic_key.clone()).or_insert(0) += 1;
            }
        }

        debug!(topics = ?topics, "New subscription created");

        Subscription::new(receiver, topics, self.subscriptions.clone(), topic_key)
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusPublisher for InMemoryBus {
    async fn publish(&self, record: BusRecord) -> Result<usize, BusError> {
        let topic = record.topic.clone();

        // Always increment counter (publication was attempted)
        self.records_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(record) {
            Ok(receiver_count) => {
                debug!(
                    topic = %topic,
                    receivers = receiver_count,
                    "Record published"
                );
                Ok(receiver_count)
            }
            Err(e) => {
                // No receivers - record is dropped, which an append-only
                // log tolerates; the producer cannot tell either way.
                warn!(
                    topic = %topic,
                    error = %e,
                    "Record dropped (no receivers)"
                );
                Ok(0)
            }
        }
    }

    fn records_published(&self) -> u64 {
        self.records_published.load(Ordering::Relaxed)
    }
}
