//! Call error taxonomy and the typed call outcome.
//!
//! Transport and timeout conditions reject a call; a handler's business
//! failure resolves it. Nothing in this layer retries; a retry mints a
//! fresh correlation id at the caller.

use shared_bus::BusError;
use std::time::Duration;
use thiserror::Error;

/// Why a call could not settle with a response.
#[derive(Debug, Error)]
pub enum CallError {
    /// The readiness gate never activated within the wait budget; the
    /// request was never published.
    #[error("bridge not ready: response consumer did not start within {waited:?}")]
    NotReady { waited: Duration },

    /// No matching response arrived within the deadline. The pending
    /// entry has been removed; a late response is dropped.
    #[error("timed out after {timeout:?} waiting for response to '{request_topic}'")]
    Timeout {
        request_topic: String,
        timeout: Duration,
    },

    /// Transport-level send error, surfaced immediately, never retried
    /// at this layer.
    #[error("publish to '{topic}' failed")]
    PublishFailed {
        topic: String,
        #[source]
        source: BusError,
    },

    /// The request payload could not be encoded into a wire envelope
    /// (payloads must be JSON objects).
    #[error("request payload could not be encoded")]
    Encode(#[from] serde_json::Error),
}

impl CallError {
    /// True for the rejection that means "never sent".
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }

    /// True when the deadline expired with no matching response.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// The typed outcome of a settled call.
///
/// A business failure is a successful settlement, not an exception: the
/// handler answered, and the caller decides what its own status should be.
/// Both variants carry the handler's full response payload (including the
/// echoed `correlationId`).
#[derive(Debug, Clone, PartialEq)]
pub enum CallReply {
    /// The handler reported success.
    Success(serde_json::Value),
    /// The handler explicitly replied with a failure payload
    /// (`success: false`).
    BusinessFailure(serde_json::Value),
}

impl CallReply {
    /// Classify a settled payload by its embedded outcome flag.
    #[must_use]
    pub fn from_settlement(payload: serde_json::Value) -> Self {
        match payload.get("success").and_then(serde_json::Value::as_bool) {
            Some(false) => Self::BusinessFailure(payload),
            _ => Self::Success(payload),
        }
    }

    /// The full response payload, whichever way it settled.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        match self {
            Self::Success(p) | Self::BusinessFailure(p) => p,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The handler's human-readable `message` field, when present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.payload().get("message").and_then(serde_json::Value::as_str)
    }
}
