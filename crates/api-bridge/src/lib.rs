//! # API Bridge - Correlated Request-Reply over the Shared Bus
//!
//! Layers synchronous-looking remote calls on top of the asynchronous,
//! fire-and-forget bus. A stateless caller issues a logical RPC - check a
//! balance, create a trade, authenticate a user - and this crate turns it
//! into a published request, a pending entry, and a deferred settlement.
//!
//! ## Flow
//!
//! ```text
//! caller ──→ RequestDispatcher.call() ──publish──→ [bus] ──→ handler
//!                      │                                        │
//!                 PendingCallStore                       publish response
//!                      ▲                                        │
//!                      └── ResponseCorrelator ←──── [bus] ←─────┘
//! ```
//!
//! ## Guarantees
//!
//! - Exactly one settlement per call: resolve-on-match and timer-fire
//!   race through one atomic map removal; the loser is a no-op.
//! - No subscription race: the readiness gate flips only after all
//!   response topics are subscribed and the correlator loop is running,
//!   and a dispatcher never publishes before the gate is up.
//! - No leaks: the timeout path removes its own entry; a sweeper catches
//!   entries whose caller future was dropped mid-wait.
//! - The bridge holds no durable state - durability comes from the bus's
//!   delivery log and the handlers' persistent store.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod correlator;
pub mod dispatcher;
pub mod domain;
pub mod readiness;

// Re-export main types
pub use config::{BridgeConfig, ConfigError};
pub use correlator::ResponseCorrelator;
pub use dispatcher::RequestDispatcher;
pub use domain::{CallError, CallReply, CorrelatedMessage, CorrelationId, PendingCallStore};
pub use readiness::ReadinessGate;

use crate::domain::pending::cleanup_task;
use shared_bus::{BusPublisher, BusSubscriber};
use shared_types::topics::RESPONSE_TOPICS;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A running bridge: the dispatcher plus its background tasks.
pub struct BridgeHandle {
    dispatcher: RequestDispatcher,
    correlator: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

impl BridgeHandle {
    /// A dispatcher handle for issuing calls; cheap to clone per call site.
    #[must_use]
    pub fn dispatcher(&self) -> RequestDispatcher {
        self.dispatcher.clone()
    }

    /// Stop the correlator loop and the expiry sweeper.
    pub fn shutdown(self) {
        self.correlator.abort();
        self.sweeper.abort();
    }
}

/// Bridge construction.
pub struct Bridge;

impl Bridge {
    /// Subscribe the fixed response-topic set, start the correlator loop
    /// and the expiry sweeper, flip the readiness gate, and hand back a
    /// dispatcher.
    ///
    /// The subscription set is established here, once, and never modified
    /// at runtime. The gate transition is monotonic: it flips exactly
    /// once, only after the subscriptions are active and the loop is
    /// spawned, so no call published through the returned dispatcher can
    /// outrun the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn start<B>(bus: Arc<B>, config: BridgeConfig) -> Result<BridgeHandle, ConfigError>
    where
        B: BusPublisher + BusSubscriber + 'static,
    {
        config.validate()?;

        let pending = Arc::new(PendingCallStore::new());
        let gate = Arc::new(ReadinessGate::new());

        let subscription = bus.subscribe(&RESPONSE_TOPICS);
        let correlator =
            tokio::spawn(ResponseCorrelator::new(subscription, pending.clone()).run());
        let sweeper = tokio::spawn(cleanup_task(pending.clone(), config.sweep_interval));

        // Subscriptions are active and the loop is live: open the gate.
        gate.mark_ready();

        let publisher: Arc<dyn BusPublisher> = bus;
        let dispatcher = RequestDispatcher::new(publisher, pending, gate, config);

        Ok(BridgeHandle {
            dispatcher,
            correlator,
            sweeper,
        })
    }
}
