//! # Outbound Ports (Driven Ports)
//!
//! Table backends required by `LatencyStoreService`.
//!
//! Production: `RocksDbTables` (feature `rocksdb`)
//! Testing: `InMemoryTables`

use shared_types::{RawPair, ResultRow};

use crate::domain::errors::StoreError;

/// Durable medium holding the `pairs` and `results` tables.
pub trait RowBackend: Send + Sync {
    /// Append one row to `pairs`.
    fn insert_pair(&self, pair: &RawPair) -> Result<(), StoreError>;

    /// Append one row to `results`.
    fn insert_result(&self, row: &ResultRow) -> Result<(), StoreError>;

    /// Append one row to each table as a single atomic operation.
    ///
    /// Either both rows are applied, or neither is.
    fn insert_both(&self, pair: &RawPair, row: &ResultRow) -> Result<(), StoreError>;

    /// Scan `pairs` in insertion order.
    fn scan_pairs(&self) -> Result<Vec<RawPair>, StoreError>;

    /// Scan `results` in insertion order.
    fn scan_results(&self) -> Result<Vec<ResultRow>, StoreError>;
}
