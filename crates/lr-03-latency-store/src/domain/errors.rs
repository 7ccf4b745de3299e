//! # Domain Errors
//!
//! `StoreError` is what a single table write can fail with.
//! `PersistenceError` is what one `append` reports, distinguishing a partial
//! failure (one of the two rows landed) from a total one.

use shared_types::{RawPair, ResultRow};
use thiserror::Error;

/// Failure of one backend operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The durable medium could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The medium refused the write (e.g. a constraint violation).
    #[error("Write rejected by {table}: {reason}")]
    Rejected { table: &'static str, reason: String },

    /// A row could not be encoded or decoded.
    #[error("Row serialization failed: {0}")]
    Serialization(String),
}

/// Failure of one `append`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The raw pair was not written; the result row was.
    #[error("Failed to write raw pair: {source}")]
    PairsWrite {
        source: StoreError,
        written: ResultRow,
    },

    /// The result row was not written; the raw pair was.
    #[error("Failed to write result row: {source}")]
    ResultsWrite { source: StoreError, written: RawPair },

    /// Neither row was written.
    #[error("Failed to write both rows: pairs: {pairs}; results: {results}")]
    Both {
        pairs: StoreError,
        results: StoreError,
    },

    /// The atomic batch holding both rows was not committed.
    #[error("Atomic write failed: {0}")]
    Atomic(StoreError),
}

impl PersistenceError {
    /// Exactly one of the two rows is durable.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::PairsWrite { .. } | Self::ResultsWrite { .. })
    }

    /// Neither row is durable.
    pub fn is_total(&self) -> bool {
        !self.is_partial()
    }
}
