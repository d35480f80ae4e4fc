//! # CFD-Broker Test Suite
//!
//! Unified test crate containing the cross-service integration tests.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/
//! │   ├── bridge_properties.rs  # Settlement/readiness/timeout guarantees
//! │   └── end_to_end.rs         # Full flows over one bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p broker-tests
//!
//! # By category
//! cargo test -p broker-tests integration::bridge_properties
//! cargo test -p broker-tests integration::end_to_end
//! ```

pub mod integration;
