//! # Relay Container
//!
//! Configuration plus the explicitly constructed transport, store, producer
//! and dispatcher handles. Nothing here is a process-wide singleton: the
//! runtime owns the container and injects its handles.

pub mod components;
pub mod config;

pub use components::RelayContainer;
pub use config::{ConfigError, RelayConfig, Role};
