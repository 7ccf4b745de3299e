//! # Latency Store (lr-03)
//!
//! Durable sink for relay latency measurements. Every delivered envelope
//! produces two append-only rows:
//!
//! ```text
//! pairs   (sender_ts, receiver_ts)
//! results (sender_ts, receiver_ts, persisted_ts)
//! ```
//!
//! `persisted_ts` is read from the store's own clock when the result row is
//! written, so `results` decomposes the pipeline into a network leg
//! (`receiver_ts - sender_ts`) and a storage leg
//! (`persisted_ts - receiver_ts`).
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Append Only | Rows are never updated or deleted |
//! | 2 | No Deduplication | The same pair appended twice yields two rows |
//! | 3 | Serialized Writes | One append's write sequence never interleaves with another's |
//! | 4 | Both Attempted | In `Independent` mode a failed pair write does not skip the result write |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Errors and write-mode configuration
//! - `ports/` - `LatencyStore` (inbound API) and `RowBackend` (outbound SPI)
//! - `adapters/` - In-memory tables and the RocksDB backend
//! - `service.rs` - `LatencyStoreService`, the dual-write logic
//!
//! ## Usage
//!
//! ```ignore
//! use lr_03_latency_store::{InMemoryLatencyStore, LatencyStore};
//!
//! let store = InMemoryLatencyStore::in_memory();
//! let record = store.append(1000, 1050)?;
//! assert_eq!(record.pair.receiver_ts, 1050);
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory::InMemoryTables;
#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb::{RocksDbConfig, RocksDbTables};
pub use domain::config::{StoreConfig, WriteMode};
pub use domain::errors::{PersistenceError, StoreError};
pub use ports::inbound::LatencyStore;
pub use ports::outbound::RowBackend;
pub use service::LatencyStoreService;

/// Latency store over in-memory tables.
pub type InMemoryLatencyStore = LatencyStoreService<InMemoryTables>;

/// Latency store over RocksDB column families.
#[cfg(feature = "rocksdb")]
pub type RocksDbLatencyStore = LatencyStoreService<RocksDbTables>;

/// Table holding raw `(sender_ts, receiver_ts)` rows.
pub const PAIRS_TABLE: &str = "pairs";

/// Table holding `(sender_ts, receiver_ts, persisted_ts)` rows.
pub const RESULTS_TABLE: &str = "results";
