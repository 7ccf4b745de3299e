//! Latency store construction.

use std::sync::Arc;

use lr_03_latency_store::{InMemoryTables, LatencyStore, LatencyStoreService, StoreError};
use shared_types::SystemTimeSource;
use tracing::info;

use crate::container::RelayConfig;

/// Open the store selected by `config`: RocksDB at `store_path` when set,
/// in-memory tables otherwise.
pub fn open_store(config: &RelayConfig) -> Result<Arc<dyn LatencyStore>, StoreError> {
    if let Some(store) = open_durable(config)? {
        return Ok(store);
    }

    info!(
        write_mode = ?config.store.write_mode,
        "[lr-03] Using in-memory latency store"
    );
    Ok(Arc::new(LatencyStoreService::new(
        Arc::new(InMemoryTables::new()),
        Arc::new(SystemTimeSource),
        config.store.clone(),
    )))
}

#[cfg(feature = "rocksdb")]
fn open_durable(config: &RelayConfig) -> Result<Option<Arc<dyn LatencyStore>>, StoreError> {
    use lr_03_latency_store::{RocksDbConfig, RocksDbTables};

    let Some(path) = &config.store_path else {
        return Ok(None);
    };
    let tables = RocksDbTables::open(RocksDbConfig::at(path.to_string_lossy()))?;
    Ok(Some(Arc::new(LatencyStoreService::new(
        Arc::new(tables),
        Arc::new(SystemTimeSource),
        config.store.clone(),
    ))))
}

#[cfg(not(feature = "rocksdb"))]
fn open_durable(_config: &RelayConfig) -> Result<Option<Arc<dyn LatencyStore>>, StoreError> {
    Ok(None)
}
