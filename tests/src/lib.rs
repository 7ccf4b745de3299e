//! # Latency-Relay Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # Producer → transport → consumer → store
//! │   ├── fixtures.rs   # Shared hub and store wiring
//! │   ├── producer.rs   # Cap, cadence, confirmation counting
//! │   └── relay.rs      # Stamping, redelivery, concurrency
//! benches/
//! └── relay_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p lr-tests
//!
//! # Benchmarks
//! cargo bench -p lr-tests
//! ```

#![allow(dead_code)]

pub mod integration;
