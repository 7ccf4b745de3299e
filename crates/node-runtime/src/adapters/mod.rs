//! # Adapters
//!
//! Thin I/O wrappers around the outside world: trust material on disk and
//! the durable latency store.

pub mod storage;
pub mod trust;

pub use storage::open_store;
pub use trust::install_trusted_certs;
