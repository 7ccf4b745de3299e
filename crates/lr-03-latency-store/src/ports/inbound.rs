//! # Inbound Port
//!
//! API the consumer dispatcher persists through.

use shared_types::{LatencyRecord, RawPair, ResultRow, Timestamp};

use crate::domain::errors::{PersistenceError, StoreError};

/// Append-only store of latency measurements.
///
/// Implementations must be safe to call from concurrent dispatcher
/// invocations.
pub trait LatencyStore: Send + Sync {
    /// Write the raw pair and the derived result row for one envelope.
    ///
    /// `persisted_ts` is taken from the store's clock after the raw pair
    /// write. Returns both rows on success.
    fn append(
        &self,
        sender_ts: Timestamp,
        receiver_ts: Timestamp,
    ) -> Result<LatencyRecord, PersistenceError>;

    /// All raw pairs in insertion order.
    fn raw_pairs(&self) -> Result<Vec<RawPair>, StoreError>;

    /// All result rows in insertion order.
    fn result_rows(&self) -> Result<Vec<ResultRow>, StoreError>;
}
