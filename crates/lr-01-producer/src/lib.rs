//! # Producer Loop (lr-01)
//!
//! Emits timestamped envelopes on the output queue at a fixed cadence, up to
//! a cap, then idles for the rest of the process lifetime.
//!
//! ## State Machine
//!
//! ```text
//!            sent_count < cap
//!          ┌──────────────────┐
//!          ▼                  │ publish, sent_count += 1, sleep(cadence)
//!     ┌─────────┐ ────────────┘
//! ──→ │ Sending │
//!     └─────────┘
//!          │ sent_count >= cap
//!          ▼
//!     ┌─────────┐ ──┐
//!     │  Idle   │   │ sleep(idle_interval), re-check
//!     └─────────┘ ←─┘
//! ```
//!
//! There is no transition back to `Sending`: a fresh run needs a restart.
//!
//! ## Confirmations
//!
//! Publishing never waits for the transport. Each `PendingConfirmation` is
//! handed to a spawned task that records it in the `ConfirmationTracker`,
//! which counts and logs only.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod service;
pub mod tracker;

pub use config::ProducerConfig;
pub use domain::ProducerState;
pub use error::{ProducerError, Result};
pub use metrics::ProducerMetrics;
pub use service::{ProducerLoop, ProducerSummary};
pub use tracker::ConfirmationTracker;

/// Maximum number of envelopes published per process lifetime.
pub const DEFAULT_CAP: u64 = 100;

/// Seconds between consecutive publishes.
pub const DEFAULT_CADENCE_SECS: u64 = 5;

/// Seconds between re-checks once the cap is reached.
pub const DEFAULT_IDLE_SECS: u64 = 1000;
