//! Configuration types for the producer loop

use serde::Deserialize;
use shared_types::OUTPUT_QUEUE;
use std::time::Duration;

use crate::error::{ProducerError, Result};

/// Runtime configuration for the producer loop
#[derive(Clone, Debug, Deserialize)]
pub struct ProducerConfig {
    /// Maximum number of publishes (default: 100)
    pub cap: u64,

    /// Interval between publishes in the Sending state (default: 5s)
    pub cadence: Duration,

    /// Interval between re-checks in the Idle state (default: 1000s)
    pub idle_interval: Duration,

    /// Output queue the envelopes are published on
    pub output_queue: String,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            cap: crate::DEFAULT_CAP,
            cadence: Duration::from_secs(crate::DEFAULT_CADENCE_SECS),
            idle_interval: Duration::from_secs(crate::DEFAULT_IDLE_SECS),
            output_queue: OUTPUT_QUEUE.to_string(),
        }
    }
}

impl ProducerConfig {
    /// Reject configurations that would spin the loop without suspending.
    pub fn validate(&self) -> Result<()> {
        if self.cadence.is_zero() {
            return Err(ProducerError::InvalidConfig(
                "cadence must be non-zero".to_string(),
            ));
        }
        if self.idle_interval.is_zero() {
            return Err(ProducerError::InvalidConfig(
                "idle interval must be non-zero".to_string(),
            ));
        }
        if self.output_queue.is_empty() {
            return Err(ProducerError::InvalidConfig(
                "output queue must be named".to_string(),
            ));
        }
        Ok(())
    }
}
