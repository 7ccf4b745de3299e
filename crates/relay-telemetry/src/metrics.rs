//! Prometheus metrics for the latency relay.
//!
//! All metrics follow the naming convention: `relay_<component>_<metric>_<unit>`
//!
//! The producer and consumer keep their own atomic counters; `RelayCounters`
//! mirrors a snapshot of them into the Prometheus counters here.

use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use shared_types::ResultRow;

use crate::TelemetryError;

/// Latency buckets in seconds: 1ms to ~16s.
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.002, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 16.0,
];

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PRODUCER METRICS (lr-01)
    // =========================================================================

    /// Publish calls issued
    pub static ref MESSAGES_PUBLISHED: IntCounter = IntCounter::new(
        "relay_producer_messages_published_total",
        "Total publish calls issued by the producer loop"
    ).expect("metric creation failed");

    /// Confirmations received, delivered or not
    pub static ref CONFIRMATIONS: IntCounter = IntCounter::new(
        "relay_producer_confirmations_total",
        "Total publish confirmations received"
    ).expect("metric creation failed");

    /// Confirmations reporting a transport error
    pub static ref CONFIRMATION_FAILURES: IntCounter = IntCounter::new(
        "relay_producer_confirmation_failures_total",
        "Total publish confirmations reporting a transport error"
    ).expect("metric creation failed");

    // =========================================================================
    // CONSUMER METRICS (lr-02)
    // =========================================================================

    /// Messages handed to the dispatcher
    pub static ref MESSAGES_RECEIVED: IntCounter = IntCounter::new(
        "relay_consumer_messages_received_total",
        "Total messages delivered to the consumer dispatcher"
    ).expect("metric creation failed");

    /// Latency records fully persisted
    pub static ref MESSAGES_PERSISTED: IntCounter = IntCounter::new(
        "relay_consumer_records_persisted_total",
        "Total latency records persisted"
    ).expect("metric creation failed");

    /// Failed appends (for alerting)
    pub static ref PERSISTENCE_FAILURES: IntCounter = IntCounter::new(
        "relay_consumer_persistence_failures_total",
        "Total latency record appends that failed"
    ).expect("metric creation failed");

    /// Undecodable payloads
    pub static ref DECODE_FAILURES: IntCounter = IntCounter::new(
        "relay_consumer_decode_failures_total",
        "Total inbound payloads that could not be decoded"
    ).expect("metric creation failed");

    // =========================================================================
    // LATENCY METRICS (lr-03)
    // =========================================================================

    /// Sender to receiver leg
    pub static ref NETWORK_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "relay_network_latency_seconds",
            "Time from sender timestamp to receiver timestamp"
        ).buckets(LATENCY_BUCKETS.to_vec())
    ).expect("metric creation failed");

    /// Receiver to storage leg
    pub static ref STORAGE_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "relay_storage_latency_seconds",
            "Time from receiver timestamp to persisted timestamp"
        ).buckets(LATENCY_BUCKETS.to_vec())
    ).expect("metric creation failed");
}

/// Handle proving the relay metrics are registered
#[derive(Debug)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors registered by this call.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once: collectors already registered are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Producer
        Box::new(MESSAGES_PUBLISHED.clone()),
        Box::new(CONFIRMATIONS.clone()),
        Box::new(CONFIRMATION_FAILURES.clone()),
        // Consumer
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(MESSAGES_PERSISTED.clone()),
        Box::new(PERSISTENCE_FAILURES.clone()),
        Box::new(DECODE_FAILURES.clone()),
        // Latency
        Box::new(NETWORK_LATENCY.clone()),
        Box::new(STORAGE_LATENCY.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Observe both legs of one result row. Skewed (negative) legs count as 0.
pub fn observe_latency(row: &ResultRow) {
    NETWORK_LATENCY.observe(row.network_latency_ms().max(0) as f64 / 1000.0);
    STORAGE_LATENCY.observe(row.storage_latency_ms().max(0) as f64 / 1000.0);
}

/// Snapshot of the relay's process-lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayCounters {
    pub published: u64,
    pub confirmed: u64,
    pub confirmation_failures: u64,
    pub received: u64,
    pub persisted: u64,
    pub persistence_failures: u64,
    pub decode_failures: u64,
}

impl RelayCounters {
    /// Advance the Prometheus counters up to this snapshot.
    ///
    /// Counters only move forward; a snapshot lower than the exported value
    /// leaves it unchanged.
    pub fn export(&self) {
        advance(&MESSAGES_PUBLISHED, self.published);
        advance(&CONFIRMATIONS, self.confirmed);
        advance(&CONFIRMATION_FAILURES, self.confirmation_failures);
        advance(&MESSAGES_RECEIVED, self.received);
        advance(&MESSAGES_PERSISTED, self.persisted);
        advance(&PERSISTENCE_FAILURES, self.persistence_failures);
        advance(&DECODE_FAILURES, self.decode_failures);
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}
