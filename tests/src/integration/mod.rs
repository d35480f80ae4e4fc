//! Cross-service integration tests.

pub mod bridge_properties;
pub mod end_to_end;
