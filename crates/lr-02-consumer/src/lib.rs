//! # Consumer Dispatcher (lr-02)
//!
//! The message handler bound to the input queue. For every delivered
//! message it:
//!
//! 1. decodes the envelope from the UTF-8 JSON payload,
//! 2. stamps `receiver_ts` from its clock,
//! 3. appends `(sender_ts, receiver_ts)` to the latency store,
//! 4. returns a disposition to the transport.
//!
//! Messages are handled independently: no buffering, batching or
//! reordering. Invocations may run concurrently; the store serializes its
//! own writes.
//!
//! ## Failure Policy
//!
//! | Failure | Logged at | Disposition |
//! |---------|-----------|-------------|
//! | Decode, `DecodeFailurePolicy::Reject` | warn | `Rejected` |
//! | Decode, `DecodeFailurePolicy::Drop` | warn | `Accepted` |
//! | Persistence | error | `Accepted` |

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod dispatcher;
pub mod metrics;

pub use config::{ConsumerConfig, DecodeFailurePolicy};
pub use dispatcher::ConsumerDispatcher;
pub use metrics::{ConsumerMetrics, ConsumerMetricsSnapshot};
