//! # Relay Envelope
//!
//! The unit of transfer. Serialized as a flat JSON object:
//!
//! ```text
//! {"sender": 1700000000000}                         (as published)
//! {"sender": 1700000000000, "receiver": 1700000000042}  (after delivery)
//! ```
//!
//! `sender_ts` / `receiver_ts` are accepted as key aliases on decode.

use serde::{Deserialize, Serialize};

use crate::entities::Timestamp;
use crate::errors::EnvelopeError;

/// Timestamped message carried from the producer to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "sender", alias = "sender_ts")]
    sender_ts: Timestamp,

    #[serde(
        rename = "receiver",
        alias = "receiver_ts",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    receiver_ts: Option<Timestamp>,
}

impl Envelope {
    /// Create an envelope stamped with the send time.
    #[must_use]
    pub fn new(sender_ts: Timestamp) -> Self {
        Self {
            sender_ts,
            receiver_ts: None,
        }
    }

    /// Send time, milliseconds since epoch.
    #[must_use]
    pub fn sender_ts(&self) -> Timestamp {
        self.sender_ts
    }

    /// Receive time, if the consumer has observed this envelope.
    #[must_use]
    pub fn receiver_ts(&self) -> Option<Timestamp> {
        self.receiver_ts
    }

    /// Whether the consumer has stamped this envelope.
    #[must_use]
    pub fn is_received(&self) -> bool {
        self.receiver_ts.is_some()
    }

    /// Stamp the receive time. Only the first stamp is kept.
    pub fn stamp_received(&mut self, receiver_ts: Timestamp) -> Result<(), EnvelopeError> {
        if let Some(existing) = self.receiver_ts {
            return Err(EnvelopeError::AlreadyReceived { existing });
        }
        self.receiver_ts = Some(receiver_ts);
        Ok(())
    }

    /// Serialize to UTF-8 JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(|e| EnvelopeError::Encode(e.to_string()))
    }

    /// Parse an envelope from a raw message payload.
    pub fn decode(payload: &[u8]) -> Result<Self, EnvelopeError> {
        let text =
            std::str::from_utf8(payload).map_err(|e| EnvelopeError::InvalidUtf8(e.to_string()))?;
        serde_json::from_str(text).map_err(|e| EnvelopeError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_envelope_is_not_received() {
        let envelope = Envelope::new(1000);
        assert_eq!(envelope.sender_ts(), 1000);
        assert_eq!(envelope.receiver_ts(), None);
        assert!(!envelope.is_received());
    }

    #[test]
    fn test_stamp_received_once() {
        let mut envelope = Envelope::new(1000);
        envelope.stamp_received(1050).unwrap();
        assert_eq!(envelope.receiver_ts(), Some(1050));

        let err = envelope.stamp_received(1070).unwrap_err();
        assert_eq!(err, EnvelopeError::AlreadyReceived { existing: 1050 });
        assert_eq!(envelope.receiver_ts(), Some(1050));
    }

    #[test]
    fn test_wire_shape_omits_unset_receiver() {
        let bytes = Envelope::new(1234).encode().unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"sender":1234}"#);
    }

    #[test]
    fn test_decode_accepts_aliases() {
        let envelope = Envelope::decode(br#"{"sender_ts": 5, "receiver_ts": 9}"#).unwrap();
        assert_eq!(envelope.sender_ts(), 5);
        assert_eq!(envelope.receiver_ts(), Some(9));
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let envelope = Envelope::decode(br#"{"sender": 5, "note": "x"}"#).unwrap();
        assert_eq!(envelope.sender_ts(), 5);
    }

    #[test]
    fn test_decode_rejects_missing_sender() {
        assert!(matches!(
            Envelope::decode(br#"{"receiver": 9}"#),
            Err(EnvelopeError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_utf8() {
        assert!(matches!(
            Envelope::decode(&[0xff, 0xfe, 0x00]),
            Err(EnvelopeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        assert!(matches!(
            Envelope::decode(b"hello"),
            Err(EnvelopeError::Decode(_))
        ));
    }
}
