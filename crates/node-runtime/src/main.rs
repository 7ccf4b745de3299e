//! # Latency Relay Node
//!
//! The main entry point for a latency-relay module.
//!
//! ## Flow
//!
//! ```text
//! Producer(lr-01) ──publish("output1")──→ Transport ──route──→ "input1"
//!                                                                 │
//!                                                                 ↓
//!                                                       Consumer(lr-02)
//!                                                                 │
//!                                                   stamp receiver_ts
//!                                                                 ↓
//!                                                    Latency Store(lr-03)
//!                                                  pairs + results rows
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging
//! 2. Load configuration from the module environment (exit 1 if incomplete)
//! 3. Register metrics
//! 4. Build components in dependency order
//! 5. Subscribe the consumer, spawn the producer
//! 6. Run until Ctrl+C or a transport fault, then shut down gracefully
//!
//! Exit status is 1 only when startup fails (e.g. `EdgeHubConnectionString`
//! unset); a transport fault ends in a normal return.

use anyhow::{Context, Result};
use tracing::{error, info};

use node_runtime::{RelayConfig, RelayContainer, RelayRuntime};
use relay_telemetry::{init_logging, register_metrics, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let telemetry = TelemetryConfig::from_env();
    init_logging(&telemetry).context("Failed to initialize logging")?;

    // Load configuration
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e).context("Failed to load relay configuration");
        }
    };

    let metrics = register_metrics().context("Failed to register metrics")?;
    info!("Registered {} metric collectors", metrics.registered());

    // Create and run the relay runtime
    let container = RelayContainer::new(config).context("Failed to build relay components")?;
    let runtime = RelayRuntime::new(container);
    let reason = runtime.run().await?;
    info!(reason = %reason, "Relay exited");

    Ok(())
}
