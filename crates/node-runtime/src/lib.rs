//! # Node Runtime Library
//!
//! This library exposes the internal modules of the relay runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: Ports define contracts, Adapters implement them
//! - **Plug-and-Play**: The sender and receiver halves are enabled by `RELAY_ROLE`

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_lines)]

pub mod adapters;
pub mod container;
pub mod error;
pub mod runtime;

pub use container::{ConfigError, RelayConfig, RelayContainer, Role};
pub use error::RelayError;
pub use runtime::{RelayRuntime, StopReason};
