//! Metrics collection for the consumer dispatcher

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the consumer dispatcher
#[derive(Debug, Default)]
pub struct ConsumerMetrics {
    /// Messages handed to the dispatcher
    pub received: AtomicU64,

    /// Latency records fully persisted
    pub persisted: AtomicU64,

    /// Appends that failed (partially or totally)
    pub persistence_failures: AtomicU64,

    /// Payloads that could not be decoded
    pub decode_failures: AtomicU64,
}

/// Point-in-time copy of `ConsumerMetrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerMetricsSnapshot {
    pub received: u64,
    pub persisted: u64,
    pub persistence_failures: u64,
    pub decode_failures: u64,
}

impl ConsumerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received message and return the running total.
    pub fn record_received(&self) -> u64 {
        self.received.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ConsumerMetricsSnapshot {
        ConsumerMetricsSnapshot {
            received: self.received.load(Ordering::SeqCst),
            persisted: self.persisted.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}
