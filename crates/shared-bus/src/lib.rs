//! # Shared Bus - Message Bus Adapter for Inter-Service Communication
//!
//! All inter-service traffic goes over named topics on an append-only,
//! at-least-once bus. This crate is the thin seam between the services and
//! the transport: string-addressed [`BusRecord`]s, the [`BusPublisher`] /
//! [`BusSubscriber`] traits, and an in-memory implementation suitable for
//! a single process (a distributed deployment slots a broker-backed
//! adapter behind the same traits).
//!
//! ## Delivery model
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Service A   │                    │  Service B   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Message Bus  │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe(topics)
//! ```
//!
//! - At-least-once: a slow subscriber that lags is skipped forward, never
//!   blocks the bus; duplicates are the consumer's problem.
//! - Ordering holds per channel only. Consumers that need pairing match by
//!   identifier, not by arrival order.
//! - No replay: a record published before a subscription is active is
//!   never seen by that subscriber.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod backoff;
pub mod publisher;
pub mod record;
pub mod subscriber;

// Re-export main types
pub use backoff::ReconnectPolicy;
pub use publisher::{BusError, BusPublisher, InMemoryBus};
pub use record::BusRecord;
pub use subscriber::{BusSubscriber, Subscription, SubscriptionError};

/// Maximum records to buffer per subscriber before it is lagged forward.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
