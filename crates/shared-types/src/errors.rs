//! # Error Types
//!
//! Errors raised while building, stamping or decoding an envelope.

use thiserror::Error;

use crate::entities::Timestamp;

/// Envelope lifecycle and wire-format errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Payload bytes are not UTF-8.
    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Payload is not a structured envelope.
    #[error("Failed to decode envelope: {0}")]
    Decode(String),

    /// Envelope could not be serialized.
    #[error("Failed to encode envelope: {0}")]
    Encode(String),

    /// `receiver_ts` was already set.
    #[error("Envelope already stamped at {existing}")]
    AlreadyReceived { existing: Timestamp },
}
