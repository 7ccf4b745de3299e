//! # Shared Types Crate
//!
//! Domain types shared by every component of the latency relay.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the `Envelope` wire shape is defined here and
//!   nowhere else.
//! - **Set-Once Timestamps**: `sender_ts` is fixed at construction and
//!   `receiver_ts` can be stamped exactly once.
//! - **Injected Clocks**: wall-clock reads go through the `TimeSource` port so
//!   that tests can pin timestamps.
//!
//! ## Relay Flow
//!
//! ```text
//! Producer ──publish(output1)──→ Transport ──route──→ input1 ──→ Dispatcher
//!    │                               │                               │
//!    └── confirmation (context) ←────┘                   LatencyStore.append
//! ```

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod time;

pub use entities::*;
pub use envelope::Envelope;
pub use errors::EnvelopeError;
pub use time::{current_time_ms, ManualTimeSource, SystemTimeSource, TimeSource};

/// Input queue the consumer side is bound to.
pub const INPUT_QUEUE: &str = "input1";

/// Output queue the producer side publishes to.
pub const OUTPUT_QUEUE: &str = "output1";
