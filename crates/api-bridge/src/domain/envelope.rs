//! Wire envelope for correlated traffic.
//!
//! Outbound records are the request fields with `correlationId` merged
//! into the same JSON object; inbound responses carry the same shape.

use crate::domain::correlation::CorrelationId;
use serde::{Deserialize, Serialize};

/// The envelope on every correlated request and response topic.
///
/// `payload` is an open, domain-specific object; flattening keeps the wire
/// format identical to what the handlers historically produced:
/// `{"userId":"u1","correlationId":"..."}`, not a nested wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatedMessage {
    #[serde(rename = "correlationId")]
    pub correlation_id: CorrelationId,
    #[serde(flatten)]
    pub payload: serde_json::Value,
}

impl CorrelatedMessage {
    /// Wrap a payload object with a correlation id.
    #[must_use]
    pub fn new(correlation_id: CorrelationId, payload: serde_json::Value) -> Self {
        Self {
            correlation_id,
            payload,
        }
    }

    /// Decode an envelope from raw record bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not JSON, or the object is missing a
    /// well-formed `correlationId`; both are dropped by the correlator
    /// as malformed.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode the envelope to record bytes.
    ///
    /// # Errors
    ///
    /// Fails when the payload is not a JSON object (flattening requires
    /// a map to merge into).
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// The full response payload as settled to the caller: every payload
    /// field plus the `correlationId` itself.
    #[must_use]
    pub fn into_settlement(self) -> serde_json::Value {
        let mut value = self.payload;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert(
                "correlationId".to_string(),
                serde_json::Value::String(self.correlation_id.to_string()),
            );
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_merges_correlation_id() {
        let id = CorrelationId::new();
        let msg = CorrelatedMessage::new(id, json!({"userId": "u1"}));
        let bytes = msg.encode().unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(raw["userId"], "u1");
        assert_eq!(raw["correlationId"], id.to_string());
        // Flat object, not a nested wrapper
        assert!(raw.get("payload").is_none());
    }

    #[test]
    fn test_decode_round_trip() {
        let id = CorrelationId::new();
        let bytes = CorrelatedMessage::new(id, json!({"success": true, "balance": 500_000}))
            .encode()
            .unwrap();

        let decoded = CorrelatedMessage::decode(&bytes).unwrap();
        assert_eq!(decoded.correlation_id, id);
        assert_eq!(decoded.payload["balance"], 500_000);
    }

    #[test]
    fn test_decode_missing_correlation_id() {
        assert!(CorrelatedMessage::decode(br#"{"success":true}"#).is_err());
    }

    #[test]
    fn test_decode_malformed_correlation_id() {
        assert!(CorrelatedMessage::decode(br#"{"correlationId":"nope"}"#).is_err());
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(CorrelatedMessage::decode(b"{truncated").is_err());
    }

    #[test]
    fn test_settlement_carries_correlation_id() {
        let id = CorrelationId::new();
        let msg = CorrelatedMessage::new(id, json!({"success": true, "balance": 500_000}));
        let settled = msg.into_settlement();
        assert_eq!(settled["success"], true);
        assert_eq!(settled["balance"], 500_000);
        assert_eq!(settled["correlationId"], id.to_string());
    }

    #[test]
    fn test_encode_rejects_non_object_payload() {
        let msg = CorrelatedMessage::new(CorrelationId::new(), json!(42));
        assert!(msg.encode().is_err());
    }
}
