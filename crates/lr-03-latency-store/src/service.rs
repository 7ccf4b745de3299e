//! # Latency Store Service
//!
//! Implements `LatencyStore` over any `RowBackend`.
//!
//! One mutex guards the whole write sequence of an `append` (raw pair,
//! clock read, result row) so concurrent dispatcher invocations never
//! interleave their rows. The guard is released on every exit path,
//! including errors.

use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{LatencyRecord, RawPair, ResultRow, SystemTimeSource, TimeSource, Timestamp};
use tracing::{debug, warn};

use crate::adapters::memory::InMemoryTables;
use crate::domain::config::{StoreConfig, WriteMode};
use crate::domain::errors::{PersistenceError, StoreError};
use crate::ports::inbound::LatencyStore;
use crate::ports::outbound::RowBackend;

/// Dual-write latency store.
pub struct LatencyStoreService<B: RowBackend> {
    backend: Arc<B>,
    time_source: Arc<dyn TimeSource>,
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl<B: RowBackend> LatencyStoreService<B> {
    pub fn new(backend: Arc<B>, time_source: Arc<dyn TimeSource>, config: StoreConfig) -> Self {
        Self {
            backend,
            time_source,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Store over `backend` with the system clock and default config.
    pub fn with_backend(backend: Arc<B>) -> Self {
        Self::new(backend, Arc::new(SystemTimeSource), StoreConfig::default())
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn write_mode(&self) -> WriteMode {
        self.config.write_mode
    }

    fn append_independent(&self, pair: RawPair) -> Result<ResultRow, PersistenceError> {
        let pairs_outcome = self.backend.insert_pair(&pair);

        let row = ResultRow {
            sender_ts: pair.sender_ts,
            receiver_ts: pair.receiver_ts,
            persisted_ts: self.time_source.now(),
        };
        let results_outcome = self.backend.insert_result(&row);

        match (pairs_outcome, results_outcome) {
            (Ok(()), Ok(())) => Ok(row),
            (Err(source), Ok(())) => Err(PersistenceError::PairsWrite {
                source,
                written: row,
            }),
            (Ok(()), Err(source)) => Err(PersistenceError::ResultsWrite {
                source,
                written: pair,
            }),
            (Err(pairs), Err(results)) => Err(PersistenceError::Both { pairs, results }),
        }
    }

    fn append_atomic(&self, pair: RawPair) -> Result<ResultRow, PersistenceError> {
        let row = ResultRow {
            sender_ts: pair.sender_ts,
            receiver_ts: pair.receiver_ts,
            persisted_ts: self.time_source.now(),
        };
        self.backend
            .insert_both(&pair, &row)
            .map_err(PersistenceError::Atomic)?;
        Ok(row)
    }
}

impl LatencyStoreService<InMemoryTables> {
    /// Store over fresh in-memory tables with the system clock.
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(InMemoryTables::new()))
    }
}

impl<B: RowBackend> LatencyStore for LatencyStoreService<B> {
    fn append(
        &self,
        sender_ts: Timestamp,
        receiver_ts: Timestamp,
    ) -> Result<LatencyRecord, PersistenceError> {
        let pair = RawPair {
            sender_ts,
            receiver_ts,
        };

        let _guard = self.write_lock.lock();
        let outcome = match self.config.write_mode {
            WriteMode::Independent => self.append_independent(pair),
            WriteMode::Atomic => self.append_atomic(pair),
        };

        match outcome {
            Ok(result) => {
                debug!(
                    sender_ts = sender_ts,
                    receiver_ts = receiver_ts,
                    persisted_ts = result.persisted_ts,
                    "[lr-03] Latency record appended"
                );
                Ok(LatencyRecord { pair, result })
            }
            Err(err) => {
                warn!(
                    sender_ts = sender_ts,
                    receiver_ts = receiver_ts,
                    partial = err.is_partial(),
                    error = %err,
                    "[lr-03] Latency record append failed"
                );
                Err(err)
            }
        }
    }

    fn raw_pairs(&self) -> Result<Vec<RawPair>, StoreError> {
        self.backend.scan_pairs()
    }

    fn result_rows(&self) -> Result<Vec<ResultRow>, StoreError> {
        self.backend.scan_results()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualTimeSource;

    fn store_at(time: u64, config: StoreConfig) -> (LatencyStoreService<InMemoryTables>, Arc<InMemoryTables>) {
        let tables = Arc::new(InMemoryTables::new());
        let store = LatencyStoreService::new(
            Arc::clone(&tables),
            Arc::new(ManualTimeSource::new(time)),
            config,
        );
        (store, tables)
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("connection refused".into())
    }

    #[test]
    fn test_append_writes_pair_and_result() {
        let (store, _) = store_at(1060, StoreConfig::default());

        let record = store.append(1000, 1050).unwrap();

        assert_eq!(record, LatencyRecord::new(1000, 1050, 1060));
        assert_eq!(
            store.raw_pairs().unwrap(),
            vec![RawPair {
                sender_ts: 1000,
                receiver_ts: 1050
            }]
        );
        assert_eq!(
            store.result_rows().unwrap(),
            vec![ResultRow {
                sender_ts: 1000,
                receiver_ts: 1050,
                persisted_ts: 1060
            }]
        );
    }

    #[test]
    fn test_duplicate_appends_are_not_deduplicated() {
        let (store, _) = store_at(1060, StoreConfig::default());

        store.append(1000, 1050).unwrap();
        store.append(1000, 1050).unwrap();

        assert_eq!(store.raw_pairs().unwrap().len(), 2);
        assert_eq!(store.result_rows().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_pair_write_still_writes_result() {
        let (store, tables) = store_at(1060, StoreConfig::default());
        tables.fail_pairs(Some(unavailable()));

        let err = store.append(1000, 1050).unwrap_err();

        assert!(err.is_partial());
        assert!(matches!(err, PersistenceError::PairsWrite { .. }));
        assert_eq!(tables.pair_count(), 0);
        assert_eq!(tables.result_count(), 1);
    }

    #[test]
    fn test_failed_result_write_keeps_pair() {
        let (store, tables) = store_at(1060, StoreConfig::default());
        tables.fail_results(Some(unavailable()));

        let err = store.append(1000, 1050).unwrap_err();

        assert_eq!(
            err,
            PersistenceError::ResultsWrite {
                source: unavailable(),
                written: RawPair {
                    sender_ts: 1000,
                    receiver_ts: 1050
                },
            }
        );
        assert_eq!(tables.pair_count(), 1);
    }

    #[test]
    fn test_both_writes_failing_is_total() {
        let (store, tables) = store_at(1060, StoreConfig::default());
        tables.fail_pairs(Some(unavailable()));
        tables.fail_results(Some(unavailable()));

        let err = store.append(1000, 1050).unwrap_err();
        assert!(err.is_total());
        assert!(matches!(err, PersistenceError::Both { .. }));
    }

    #[test]
    fn test_atomic_mode_writes_nothing_on_failure() {
        let (store, tables) = store_at(1060, StoreConfig::atomic());
        tables.fail_results(Some(unavailable()));

        let err = store.append(1000, 1050).unwrap_err();

        assert!(matches!(err, PersistenceError::Atomic(_)));
        assert_eq!(tables.pair_count(), 0);
        assert_eq!(tables.result_count(), 0);

        tables.fail_results(None);
        assert!(store.append(1000, 1050).is_ok());
        assert_eq!(tables.pair_count(), 1);
        assert_eq!(tables.result_count(), 1);
    }

    #[test]
    fn test_concurrent_appends_keep_rows_aligned() {
        let (store, _) = store_at(5000, StoreConfig::default());
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50u64 {
                        let sender_ts = t * 1000 + i;
                        store.append(sender_ts, sender_ts + 7).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let pairs = store.raw_pairs().unwrap();
        let results = store.result_rows().unwrap();
        assert_eq!(pairs.len(), 400);
        assert_eq!(results.len(), 400);

        // Serialized appends keep the i-th pair and i-th result together.
        for (pair, row) in pairs.iter().zip(&results) {
            assert_eq!(pair.sender_ts, row.sender_ts);
            assert_eq!(pair.receiver_ts, row.receiver_ts);
            assert_eq!(row.receiver_ts, row.sender_ts + 7);
        }
    }
}
