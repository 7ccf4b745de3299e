//! # Relay Telemetry
//!
//! Logging and metrics for the latency relay.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an env filter and either pretty
//!   or JSON output
//! - **Metrics**: Prometheus registry with the relay counters and the
//!   latency histograms
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_telemetry::{init_logging, register_metrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! let _metrics = register_metrics()?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RELAY_SERVICE_NAME` | `latency-relay` | Service name in log records |
//! | `RELAY_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `RELAY_JSON_LOGS` | `true` in containers | JSON formatted logs |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, observe_latency, register_metrics, MetricsHandle, RelayCounters,
    CONFIRMATIONS, CONFIRMATION_FAILURES, DECODE_FAILURES, MESSAGES_PERSISTED,
    MESSAGES_PUBLISHED, MESSAGES_RECEIVED, NETWORK_LATENCY, PERSISTENCE_FAILURES, REGISTRY,
    STORAGE_LATENCY,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
