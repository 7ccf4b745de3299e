//! Metrics collection for the producer loop

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the producer loop
#[derive(Debug, Default)]
pub struct ProducerMetrics {
    /// Publish calls handed to the transport
    pub published: AtomicU64,

    /// Publish calls the transport refused synchronously
    pub publish_errors: AtomicU64,

    /// Idle re-checks after the cap was reached
    pub idle_checks: AtomicU64,
}

impl ProducerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_error(&self) {
        self.publish_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_idle_check(&self) {
        self.idle_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn get_publish_errors(&self) -> u64 {
        self.publish_errors.load(Ordering::Relaxed)
    }

    pub fn get_idle_checks(&self) -> u64 {
        self.idle_checks.load(Ordering::Relaxed)
    }
}
