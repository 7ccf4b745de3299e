//! Runtime error types.

use lr_01_producer::ProducerError;
use lr_03_latency_store::StoreError;
use relay_telemetry::TelemetryError;
use shared_bus::TransportError;
use thiserror::Error;

use crate::container::ConfigError;

/// Errors surfaced by the relay runtime.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Latency store error: {0}")]
    Store(#[from] StoreError),

    #[error("Producer error: {0}")]
    Producer(#[from] ProducerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// `start` was called twice.
    #[error("Relay runtime already started")]
    AlreadyStarted,
}
