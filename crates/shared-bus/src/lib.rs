//! # Shared Bus - Transport Client for the Latency Relay
//!
//! Abstracts the asynchronous publish/subscribe channel between the sender
//! module and the receiver module.
//!
//! ## Contract
//!
//! - `publish` returns immediately with a `PendingConfirmation` that resolves
//!   **exactly once** to a `Confirmation` carrying the envelope, the
//!   `SendResult` and the caller's `ConfirmationContext`.
//! - `subscribe` binds exactly one `MessageHandler` to a named input queue.
//!   Messages routed to an input with no handler are silently dropped.
//! - Handlers may run concurrently with each other and with publishers.
//!
//! ## Queue Routing
//!
//! ```text
//! ┌──────────────┐                          ┌──────────────┐
//! │ Sender       │  publish("output1")      │ Receiver     │
//! │              │ ──────┐                  │  "input1"    │
//! └──────────────┘       │                  └──────────────┘
//!                        ▼                         ↑
//!                  ┌──────────────┐  route         │
//!                  │ Transport    │ ───────────────┘
//!                  │ (hub)        │  output1 → input1
//!                  └──────────────┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod connection;
pub mod error;
pub mod message;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use connection::ConnectionString;
pub use error::TransportError;
pub use message::{Confirmation, MessageProperties, TransportMessage};
pub use publisher::{HubStats, InMemoryTransport, PendingConfirmation, TransportClient};
pub use subscriber::{HandlerRegistry, MessageHandler};

/// Wire protocol the transport speaks underneath. Only MQTT is supported.
pub const PROTOCOL: &str = "MQTT";

/// Maximum time in milliseconds until a published message times out.
pub const DEFAULT_MESSAGE_TIMEOUT_MS: u64 = 10_000;
