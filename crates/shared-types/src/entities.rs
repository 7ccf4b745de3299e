//! # Core Entities
//!
//! Value types that travel between the relay components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Opaque correlation token handed to `publish` and returned unchanged in
/// the matching confirmation. Used for counting and logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConfirmationContext(pub u64);

impl fmt::Display for ConfirmationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ConfirmationContext {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Outcome reported by a publish confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendResult {
    /// The transport accepted the message.
    Delivered,
    /// The transport failed to take the message.
    TransportError(String),
}

impl SendResult {
    /// Whether the publish went through.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for SendResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "OK"),
            Self::TransportError(reason) => write!(f, "ERROR ({})", reason),
        }
    }
}

/// Acknowledgment a message handler returns to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// Message processed; the transport may complete it.
    Accepted,
    /// Message is unusable; the transport must not redeliver it.
    Rejected,
    /// Handler gave up; the transport may redeliver.
    Abandoned,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Abandoned => "ABANDONED",
        };
        f.write_str(label)
    }
}

/// Raw `(sender_ts, receiver_ts)` row of the `pairs` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPair {
    pub sender_ts: Timestamp,
    pub receiver_ts: Timestamp,
}

/// Derived `(sender_ts, receiver_ts, persisted_ts)` row of the `results` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub sender_ts: Timestamp,
    pub receiver_ts: Timestamp,
    pub persisted_ts: Timestamp,
}

impl ResultRow {
    /// Sender to receiver leg. Negative when the clocks are skewed.
    #[must_use]
    pub fn network_latency_ms(&self) -> i64 {
        self.receiver_ts as i64 - self.sender_ts as i64
    }

    /// Receiver to storage leg.
    #[must_use]
    pub fn storage_latency_ms(&self) -> i64 {
        self.persisted_ts as i64 - self.receiver_ts as i64
    }

    /// Whole pipeline, sender to storage.
    #[must_use]
    pub fn end_to_end_ms(&self) -> i64 {
        self.persisted_ts as i64 - self.sender_ts as i64
    }
}

/// Both rows written for one delivered envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRecord {
    pub pair: RawPair,
    pub result: ResultRow,
}

impl LatencyRecord {
    /// Build the row pair for one persisted delivery.
    #[must_use]
    pub fn new(sender_ts: Timestamp, receiver_ts: Timestamp, persisted_ts: Timestamp) -> Self {
        Self {
            pair: RawPair {
                sender_ts,
                receiver_ts,
            },
            result: ResultRow {
                sender_ts,
                receiver_ts,
                persisted_ts,
            },
        }
    }
}
