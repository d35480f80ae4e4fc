//! # DB Processor - Domain Handlers over the Persistent Store
//!
//! One shared consumer loop over the fixed request-topic set; a dispatch
//! table keyed by topic routes each record to its handler. Handlers
//! validate, mutate the store transactionally, and always produce exactly
//! one correlated response - success and business failure alike - so the
//! caller settles instead of timing out.
//!
//! ## Contract
//!
//! - Invalid payload with a usable `correlationId`: publish a correlated
//!   business-failure response immediately.
//! - A record whose `correlationId` cannot be recovered is logged and
//!   dropped; there is nothing to correlate.
//! - Mutations that touch more than one record (margin debit + trade
//!   creation, user + opening balance) commit or fail together.
//! - Internal errors are caught and still answered with a correlated
//!   failure payload; nothing throws past a handler.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod handlers;
pub mod messages;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::memory::MemoryStore;
pub use ports::{BrokerStore, OpenTrade, StoreError, TradeOutcome};
pub use service::{DbProcessor, DbProcessorHandle};
