//! # Bus Records
//!
//! The unit of publication: a topic name, an optional partition key, and
//! an opaque JSON payload.

use serde::{Deserialize, Serialize};

/// A single record on the bus.
///
/// The payload is opaque bytes to the transport; by convention every
/// service on this bus writes UTF-8 JSON. The key, when present, pins
/// related records to one partition so per-key ordering holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusRecord {
    /// Topic this record was published to.
    pub topic: String,
    /// Optional partition key.
    pub key: Option<String>,
    /// Serialized payload.
    pub payload: Vec<u8>,
}

impl BusRecord {
    /// Build a record from any serializable payload.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if the payload cannot be
    /// serialized.
    pub fn json<T: Serialize>(
        topic: impl Into<String>,
        key: Option<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            topic: topic.into(),
            key,
            payload: serde_json::to_vec(payload)?,
        })
    }

    /// Deserialize the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error on malformed payloads.
    pub fn parse<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
