//! # In-Memory Tables
//!
//! `RowBackend` over two vectors. Supports failure injection per table so
//! tests can drive partial and total persistence failures.

use parking_lot::RwLock;
use shared_types::{RawPair, ResultRow};

use crate::domain::errors::StoreError;
use crate::ports::outbound::RowBackend;

/// In-memory `pairs` and `results` tables.
#[derive(Debug, Default)]
pub struct InMemoryTables {
    pairs: RwLock<Vec<RawPair>>,
    results: RwLock<Vec<ResultRow>>,
    pairs_failure: RwLock<Option<StoreError>>,
    results_failure: RwLock<Option<StoreError>>,
}

impl InMemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `pairs` write fail with `error` (`None` clears it).
    pub fn fail_pairs(&self, error: Option<StoreError>) {
        *self.pairs_failure.write() = error;
    }

    /// Make every later `results` write fail with `error` (`None` clears it).
    pub fn fail_results(&self, error: Option<StoreError>) {
        *self.results_failure.write() = error;
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.read().len()
    }

    pub fn result_count(&self) -> usize {
        self.results.read().len()
    }

    fn check(slot: &RwLock<Option<StoreError>>) -> Result<(), StoreError> {
        match slot.read().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RowBackend for InMemoryTables {
    fn insert_pair(&self, pair: &RawPair) -> Result<(), StoreError> {
        Self::check(&self.pairs_failure)?;
        self.pairs.write().push(*pair);
        Ok(())
    }

    fn insert_result(&self, row: &ResultRow) -> Result<(), StoreError> {
        Self::check(&self.results_failure)?;
        self.results.write().push(*row);
        Ok(())
    }

    fn insert_both(&self, pair: &RawPair, row: &ResultRow) -> Result<(), StoreError> {
        Self::check(&self.pairs_failure)?;
        Self::check(&self.results_failure)?;

        // Lock order: pairs, then results.
        let mut pairs = self.pairs.write();
        let mut results = self.results.write();
        pairs.push(*pair);
        results.push(*row);
        Ok(())
    }

    fn scan_pairs(&self) -> Result<Vec<RawPair>, StoreError> {
        Ok(self.pairs.read().clone())
    }

    fn scan_results(&self) -> Result<Vec<ResultRow>, StoreError> {
        Ok(self.results.read().clone())
    }
}
