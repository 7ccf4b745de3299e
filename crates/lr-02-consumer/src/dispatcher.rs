//! Consumer dispatcher implementation

use std::sync::Arc;

use async_trait::async_trait;
use lr_03_latency_store::LatencyStore;
use relay_telemetry::observe_latency;
use shared_bus::{MessageHandler, TransportMessage};
use shared_types::{Disposition, Envelope, EnvelopeError, TimeSource};
use tracing::{debug, error, info, warn};

use crate::config::{ConsumerConfig, DecodeFailurePolicy};
use crate::metrics::ConsumerMetrics;

/// Message handler that stamps and persists relayed envelopes.
pub struct ConsumerDispatcher {
    store: Arc<dyn LatencyStore>,
    time_source: Arc<dyn TimeSource>,
    config: ConsumerConfig,
    metrics: Arc<ConsumerMetrics>,
}

impl ConsumerDispatcher {
    pub fn new(
        store: Arc<dyn LatencyStore>,
        time_source: Arc<dyn TimeSource>,
        config: ConsumerConfig,
    ) -> Self {
        info!("[lr-02] Initializing consumer dispatcher");
        info!("  Input queue: {}", config.input_queue);
        info!("  Decode failure policy: {:?}", config.decode_failure_policy);

        Self {
            store,
            time_source,
            config,
            metrics: Arc::new(ConsumerMetrics::new()),
        }
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<ConsumerMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &Arc<dyn LatencyStore> {
        &self.store
    }

    /// Decode the payload and stamp the receive time.
    fn receive(&self, message: &TransportMessage) -> Result<Envelope, EnvelopeError> {
        let mut envelope = Envelope::decode(message.payload())?;
        envelope.stamp_received(self.time_source.now())?;
        Ok(envelope)
    }

    fn on_decode_failure(&self, message: &TransportMessage, err: &EnvelopeError) -> Disposition {
        self.metrics.record_decode_failure();
        let disposition = match self.config.decode_failure_policy {
            DecodeFailurePolicy::Reject => Disposition::Rejected,
            DecodeFailurePolicy::Drop => Disposition::Accepted,
        };
        warn!(
            message_id = ?message.message_id(),
            bytes = message.payload().len(),
            error = %err,
            disposition = %disposition,
            "[lr-02] Undecodable message"
        );
        disposition
    }
}

#[async_trait]
impl MessageHandler for ConsumerDispatcher {
    async fn handle(&self, message: TransportMessage) -> Disposition {
        let total = self.metrics.record_received();

        let envelope = match self.receive(&message) {
            Ok(envelope) => envelope,
            Err(err) => return self.on_decode_failure(&message, &err),
        };
        let sender_ts = envelope.sender_ts();
        let receiver_ts = envelope.receiver_ts().unwrap_or_default();

        info!(
            sender_ts = sender_ts,
            receiver_ts = receiver_ts,
            total = total,
            "[lr-02] Message received"
        );

        // The store may block on its medium; keep that off the async workers.
        let store = Arc::clone(&self.store);
        let outcome =
            tokio::task::spawn_blocking(move || store.append(sender_ts, receiver_ts)).await;

        match outcome {
            Ok(Ok(record)) => {
                self.metrics.record_persisted();
                observe_latency(&record.result);
                debug!(
                    network_ms = record.result.network_latency_ms(),
                    storage_ms = record.result.storage_latency_ms(),
                    "[lr-02] Latency record persisted"
                );
                Disposition::Accepted
            }
            Ok(Err(err)) => {
                self.metrics.record_persistence_failure();
                error!(
                    sender_ts = sender_ts,
                    receiver_ts = receiver_ts,
                    partial = err.is_partial(),
                    error = %err,
                    "[lr-02] Failed to persist latency record"
                );
                Disposition::Accepted
            }
            Err(join_err) => {
                self.metrics.record_persistence_failure();
                error!(
                    sender_ts = sender_ts,
                    error = %join_err,
                    "[lr-02] Store write aborted"
                );
                Disposition::Abandoned
            }
        }
    }
}
