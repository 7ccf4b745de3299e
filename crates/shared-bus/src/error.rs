//! Transport error types.

use thiserror::Error;

/// Errors surfaced by the transport client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Envelope could not be turned into a message payload.
    #[error("Failed to encode message: {0}")]
    Encode(String),

    /// `publish` was called outside of an async runtime.
    #[error("No async runtime available for delivery")]
    NoRuntime,

    /// The input queue already has a handler.
    #[error("Queue {0} already has a message handler")]
    AlreadySubscribed(String),

    /// Installing trusted certificates failed.
    #[error("set_option TrustedCerts failed: {0}")]
    TrustedCerts(String),

    /// Connection string is missing a field or malformed.
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Runtime fault (e.g. connectivity loss).
    #[error("Transport faulted: {0}")]
    Faulted(String),

    /// The transport was closed.
    #[error("Transport closed")]
    Closed,
}

impl TransportError {
    /// Whether the error ends the transport's useful life.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Faulted(_) | Self::Closed)
    }
}
