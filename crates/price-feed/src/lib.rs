//! # Price Feed - Upstream Tick Ingestion
//!
//! Connects to the exchange's streaming feed, subscribes the configured
//! symbols, and republishes every tick to the `price-updates` topic.
//!
//! The upstream connection is a long-lived shared resource: on stream
//! loss the poller reconnects with exponential backoff, capped, and the
//! delay resets to its initial value after a successful reconnect - the
//! same discipline every bus-facing component uses.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod poller;
pub mod simulated;
pub mod source;

pub use config::FeedConfig;
pub use poller::PricePoller;
pub use simulated::SimulatedSource;
pub use source::{FeedError, PriceSource, TickStream};
