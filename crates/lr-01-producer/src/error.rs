//! Error types for the producer loop

use thiserror::Error;

/// Result type alias for producer operations
pub type Result<T> = std::result::Result<T, ProducerError>;

/// Errors that can occur while running the producer loop
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProducerError {
    /// Configuration cannot drive the loop
    #[error("Invalid producer configuration: {0}")]
    InvalidConfig(String),

    /// `run` was called while the loop is already running
    #[error("Producer loop is already running")]
    AlreadyRunning,
}
