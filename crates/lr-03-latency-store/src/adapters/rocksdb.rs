//! # RocksDB Tables
//!
//! Durable `RowBackend` with one column family per table.
//!
//! ## Column Families
//!
//! - `pairs` - raw `(sender_ts, receiver_ts)` rows
//! - `results` - `(sender_ts, receiver_ts, persisted_ts)` rows
//!
//! Keys are big-endian `u64` sequence numbers so iteration order is
//! insertion order; values are bincode-encoded rows. Sequences resume from
//! the last key on reopen.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{RawPair, ResultRow};
use tracing::info;

use crate::domain::errors::StoreError;
use crate::ports::outbound::RowBackend;
use crate::{PAIRS_TABLE, RESULTS_TABLE};

/// All column families used by the store
pub const COLUMN_FAMILIES: &[&str] = &[PAIRS_TABLE, RESULTS_TABLE];

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/latency".to_string(),
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Config at `path` with default tuning
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create config for testing (small buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 1024 * 1024, // 1MB
            sync_writes: false,
        }
    }
}

/// RocksDB-backed `pairs` and `results` tables
pub struct RocksDbTables {
    db: RwLock<DB>,
    config: RocksDbConfig,
    next_pair: AtomicU64,
    next_result: AtomicU64,
}

impl RocksDbTables {
    /// Open or create the database, creating missing column families
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StoreError::Unavailable(format!("Failed to open RocksDB: {}", e)))?;

        let next_pair = next_sequence(&db, PAIRS_TABLE)?;
        let next_result = next_sequence(&db, RESULTS_TABLE)?;

        info!(
            path = %config.path,
            pairs = next_pair,
            results = next_result,
            "[lr-03] RocksDB latency store opened"
        );

        Ok(Self {
            db: RwLock::new(db),
            config,
            next_pair: AtomicU64::new(next_pair),
            next_result: AtomicU64::new(next_result),
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }

    fn put_row<T: Serialize>(
        &self,
        table: &'static str,
        sequence: &AtomicU64,
        row: &T,
    ) -> Result<(), StoreError> {
        let value = encode_row(row)?;
        let db = self.db.write();
        let cf = column(&db, table)?;
        let key = sequence.load(Ordering::SeqCst).to_be_bytes();

        db.put_cf_opt(cf, key, value, &self.write_opts())
            .map_err(|e| StoreError::Rejected {
                table,
                reason: format!("RocksDB put failed: {}", e),
            })?;
        sequence.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn scan<T: DeserializeOwned>(&self, table: &'static str) -> Result<Vec<T>, StoreError> {
        let db = self.db.read();
        let cf = column(&db, table)?;
        let mut rows = Vec::new();

        for item in db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| {
                StoreError::Unavailable(format!("RocksDB scan of {} failed: {}", table, e))
            })?;
            rows.push(decode_row(&value)?);
        }
        Ok(rows)
    }
}

impl RowBackend for RocksDbTables {
    fn insert_pair(&self, pair: &RawPair) -> Result<(), StoreError> {
        self.put_row(PAIRS_TABLE, &self.next_pair, pair)
    }

    fn insert_result(&self, row: &ResultRow) -> Result<(), StoreError> {
        self.put_row(RESULTS_TABLE, &self.next_result, row)
    }

    fn insert_both(&self, pair: &RawPair, row: &ResultRow) -> Result<(), StoreError> {
        let pair_value = encode_row(pair)?;
        let row_value = encode_row(row)?;

        let db = self.db.write();
        let pairs_cf = column(&db, PAIRS_TABLE)?;
        let results_cf = column(&db, RESULTS_TABLE)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            pairs_cf,
            self.next_pair.load(Ordering::SeqCst).to_be_bytes(),
            pair_value,
        );
        batch.put_cf(
            results_cf,
            self.next_result.load(Ordering::SeqCst).to_be_bytes(),
            row_value,
        );

        db.write_opt(batch, &self.write_opts())
            .map_err(|e| StoreError::Unavailable(format!("RocksDB batch write failed: {}", e)))?;

        self.next_pair.fetch_add(1, Ordering::SeqCst);
        self.next_result.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn scan_pairs(&self) -> Result<Vec<RawPair>, StoreError> {
        self.scan(PAIRS_TABLE)
    }

    fn scan_results(&self) -> Result<Vec<ResultRow>, StoreError> {
        self.scan(RESULTS_TABLE)
    }
}

fn column<'a>(db: &'a DB, table: &'static str) -> Result<&'a rocksdb::ColumnFamily, StoreError> {
    db.cf_handle(table)
        .ok_or_else(|| StoreError::Unavailable(format!("Missing column family {}", table)))
}

/// One past the last sequence number written to `table`.
fn next_sequence(db: &DB, table: &'static str) -> Result<u64, StoreError> {
    let cf = column(db, table)?;
    match db.iterator_cf(cf, IteratorMode::End).next() {
        None => Ok(0),
        Some(Ok((key, _))) => {
            let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                StoreError::Serialization(format!("Malformed key in {}", table))
            })?;
            Ok(u64::from_be_bytes(bytes) + 1)
        }
        Some(Err(e)) => Err(StoreError::Unavailable(format!(
            "RocksDB scan of {} failed: {}",
            table, e
        ))),
    }
}

fn encode_row<T: Serialize>(row: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(row).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_row<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
