//! # Producer Integration Tests
//!
//! The producer loop publishing through the routed hub:
//!
//! 1. **Cap**: exactly `cap` publishes over an extended simulated run
//! 2. **Cadence**: consecutive publishes at least one interval apart
//! 3. **Confirmation counting**: confirmed total equals the number of
//!    publishes, whatever order the confirmations arrive in

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use lr_01_producer::{ProducerConfig, ProducerLoop, ProducerState};
    use parking_lot::Mutex;
    use shared_bus::{
        Confirmation, InMemoryTransport, MessageHandler, MessageProperties, PendingConfirmation,
        TransportClient, TransportError,
    };
    use shared_types::{
        ConfirmationContext, Envelope, ManualTimeSource, SendResult, SystemTimeSource,
        OUTPUT_QUEUE,
    };
    use tokio::sync::{oneshot, watch};
    use tokio::time::Instant;

    use crate::integration::fixtures::RelayFixture;

    fn config(cap: u64) -> ProducerConfig {
        ProducerConfig {
            cap,
            cadence: Duration::from_secs(5),
            idle_interval: Duration::from_secs(1000),
            output_queue: OUTPUT_QUEUE.to_string(),
        }
    }

    /// Hub wrapper that records when each publish happened.
    struct TimedTransport {
        inner: InMemoryTransport,
        instants: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl TransportClient for TimedTransport {
        fn publish(
            &self,
            queue: &str,
            envelope: Envelope,
            context: ConfirmationContext,
        ) -> Result<PendingConfirmation, TransportError> {
            self.instants.lock().push(Instant::now());
            self.inner.publish(queue, envelope, context)
        }

        fn subscribe(
            &self,
            queue: &str,
            handler: Arc<dyn MessageHandler>,
        ) -> Result<(), TransportError> {
            self.inner.subscribe(queue, handler)
        }

        fn set_trusted_certs(&self, pem: &str) -> Result<(), TransportError> {
            self.inner.set_trusted_certs(pem)
        }

        fn set_message_timeout(&self, timeout_ms: u64) {
            self.inner.set_message_timeout(timeout_ms)
        }

        async fn faulted(&self) -> TransportError {
            self.inner.faulted().await
        }
    }

    /// Holds every confirmation until the test releases it.
    #[derive(Default)]
    struct DeferredTransport {
        pending: Mutex<Vec<(oneshot::Sender<Confirmation>, Envelope, ConfirmationContext)>>,
    }

    impl DeferredTransport {
        /// Confirm every held publish in reverse order.
        fn release_reversed(&self) -> usize {
            let mut pending = std::mem::take(&mut *self.pending.lock());
            let count = pending.len();
            while let Some((tx, envelope, context)) = pending.pop() {
                let _ = tx.send(Confirmation {
                    envelope,
                    result: SendResult::Delivered,
                    context,
                    properties: MessageProperties::new(),
                });
            }
            count
        }
    }

    #[async_trait]
    impl TransportClient for DeferredTransport {
        fn publish(
            &self,
            _queue: &str,
            envelope: Envelope,
            context: ConfirmationContext,
        ) -> Result<PendingConfirmation, TransportError> {
            let (tx, pending) =
                PendingConfirmation::channel(envelope, context, MessageProperties::new());
            self.pending.lock().push((tx, envelope, context));
            Ok(pending)
        }

        fn subscribe(
            &self,
            _queue: &str,
            _handler: Arc<dyn MessageHandler>,
        ) -> Result<(), TransportError> {
            Ok(())
        }

        fn set_trusted_certs(&self, _pem: &str) -> Result<(), TransportError> {
            Ok(())
        }

        fn set_message_timeout(&self, _timeout_ms: u64) {}

        async fn faulted(&self) -> TransportError {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cap_enforced_over_extended_run() {
        let fixture = RelayFixture::new(
            Arc::new(SystemTimeSource),
            Arc::new(SystemTimeSource),
        );
        let producer = Arc::new(
            ProducerLoop::new(
                Arc::new(fixture.hub.clone()),
                Arc::new(SystemTimeSource),
                config(100),
            )
            .unwrap(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = {
            let producer = Arc::clone(&producer);
            tokio::spawn(async move { producer.run(shutdown_rx).await })
        };

        // 100 sends take 500s; then run ten idle periods on top.
        tokio::time::sleep(Duration::from_secs(500 + 10_000)).await;
        assert_eq!(producer.state(), ProducerState::Idle);
        assert_eq!(fixture.hub.stats().published, 100);

        shutdown_tx.send(true).unwrap();
        let summary = task.await.unwrap().unwrap();
        assert_eq!(summary.sent, 100);
        assert_eq!(fixture.hub.stats().published, 100);

        fixture.settle(100).await;
        assert_eq!(fixture.tables.pair_count(), 100);
        assert_eq!(fixture.tables.result_count(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_between_publishes() {
        let hub = InMemoryTransport::new();
        let transport = Arc::new(TimedTransport {
            inner: hub,
            instants: Mutex::new(Vec::new()),
        });
        let producer = Arc::new(
            ProducerLoop::new(transport.clone(), Arc::new(SystemTimeSource), config(12)).unwrap(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = {
            let producer = Arc::clone(&producer);
            tokio::spawn(async move { producer.run(shutdown_rx).await })
        };

        tokio::time::sleep(Duration::from_secs(120)).await;
        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();

        let instants = transport.instants.lock().clone();
        assert_eq!(instants.len(), 12);
        for pair in instants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmations_counted_in_any_order() {
        let transport = Arc::new(DeferredTransport::default());
        let producer = Arc::new(
            ProducerLoop::new(
                transport.clone(),
                Arc::new(ManualTimeSource::new(1_000)),
                config(20),
            )
            .unwrap(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = {
            let producer = Arc::clone(&producer);
            tokio::spawn(async move { producer.run(shutdown_rx).await })
        };

        tokio::time::sleep(Duration::from_secs(20 * 5)).await;
        assert_eq!(producer.sent_count(), 20);
        assert_eq!(producer.tracker().confirmed(), 0);

        assert_eq!(transport.release_reversed(), 20);
        producer.tracker().wait_for(20).await;

        shutdown_tx.send(true).unwrap();
        let summary = task.await.unwrap().unwrap();
        assert_eq!(summary.confirmed, 20);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_closed_hub_confirms_transport_errors() {
        let hub = InMemoryTransport::new();
        hub.close();
        let producer = Arc::new(
            ProducerLoop::new(Arc::new(hub), Arc::new(SystemTimeSource), config(1)).unwrap(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = {
            let producer = Arc::clone(&producer);
            tokio::spawn(async move { producer.run(shutdown_rx).await })
        };

        producer.tracker().wait_for(1).await;
        shutdown_tx.send(true).unwrap();
        let summary = task.await.unwrap().unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(summary.confirmed, 1);
        assert_eq!(summary.failed, 1);
    }
}
