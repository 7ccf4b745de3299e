//! # Cross-Crate Integration Tests
//!
//! Every flow runs over the in-memory hub with the route
//! `output1 → input1`, exactly as the node runtime wires it.

#[cfg(test)]
pub mod fixtures;
pub mod producer;
pub mod relay;
