//! # Shared Types Crate
//!
//! Domain value types shared by every service in the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-service types are defined here.
//! - **Lossless Amounts**: Currency and quantity are scaled integers
//!   (`UsdCents`, `Quantity`), serialized as plain JSON integers. No floats
//!   or decimal strings cross a service boundary.

pub mod entities;
pub mod money;
pub mod topics;

pub use entities::*;
pub use money::{Quantity, UsdCents};
