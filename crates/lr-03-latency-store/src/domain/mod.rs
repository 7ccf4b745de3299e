//! Domain layer for the latency store.

pub mod config;
pub mod errors;
