//! # Relay Integration Tests
//!
//! Envelopes published on `output1` and persisted by the consumer
//! dispatcher on `input1`:
//!
//! 1. **Stamping**: receiver_ts never precedes the publish time
//! 2. **Redelivery**: the same envelope twice yields two rows
//! 3. **Concurrency**: N concurrent deliveries yield exactly N rows of each
//!    kind with no lost counter updates

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use shared_bus::TransportClient;
    use shared_types::{
        current_time_ms, ConfirmationContext, Envelope, ManualTimeSource, RawPair, ResultRow,
        SendResult, SystemTimeSource, OUTPUT_QUEUE,
    };

    use crate::integration::fixtures::RelayFixture;
    use lr_03_latency_store::LatencyStore;

    async fn publish(fixture: &RelayFixture, sender_ts: u64, context: u64) -> SendResult {
        fixture
            .hub
            .publish(
                OUTPUT_QUEUE,
                Envelope::new(sender_ts),
                ConfirmationContext(context),
            )
            .unwrap()
            .await
            .result
    }

    #[tokio::test]
    async fn test_example_scenario_rows() {
        let fixture = RelayFixture::new(
            Arc::new(ManualTimeSource::new(1050)),
            Arc::new(ManualTimeSource::new(1060)),
        );

        assert_eq!(publish(&fixture, 1000, 0).await, SendResult::Delivered);
        fixture.settle(1).await;

        assert_eq!(
            fixture.store.raw_pairs().unwrap(),
            vec![RawPair {
                sender_ts: 1000,
                receiver_ts: 1050
            }]
        );
        assert_eq!(
            fixture.store.result_rows().unwrap(),
            vec![ResultRow {
                sender_ts: 1000,
                receiver_ts: 1050,
                persisted_ts: 1060
            }]
        );
    }

    #[tokio::test]
    async fn test_receiver_ts_not_before_publish_time() {
        let fixture = RelayFixture::new(Arc::new(SystemTimeSource), Arc::new(SystemTimeSource));

        let mut handed_over = Vec::new();
        for i in 0..20u64 {
            let now = current_time_ms();
            handed_over.push(now);
            publish(&fixture, now, i).await;
        }
        fixture.settle(20).await;

        let pairs = fixture.store.raw_pairs().unwrap();
        assert_eq!(pairs.len(), 20);
        for pair in pairs {
            assert!(handed_over.contains(&pair.sender_ts));
            assert!(pair.receiver_ts >= pair.sender_ts);
        }
        for row in fixture.store.result_rows().unwrap() {
            assert!(row.persisted_ts >= row.receiver_ts);
        }
    }

    #[tokio::test]
    async fn test_redelivery_appends_second_row() {
        let fixture = RelayFixture::new(
            Arc::new(ManualTimeSource::new(1050)),
            Arc::new(ManualTimeSource::new(1060)),
        );

        publish(&fixture, 1000, 0).await;
        publish(&fixture, 1000, 1).await;
        fixture.settle(2).await;

        let pairs = fixture.store.raw_pairs().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], pairs[1]);
        let rows = fixture.store.result_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], rows[1]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deliveries_lose_nothing() {
        const N: u64 = 200;
        let fixture = Arc::new(RelayFixture::new(
            Arc::new(SystemTimeSource),
            Arc::new(SystemTimeSource),
        ));

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let fixture = Arc::clone(&fixture);
                tokio::spawn(async move { publish(&fixture, 10_000 + i, i).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), SendResult::Delivered);
        }
        fixture.settle(N).await;

        assert_eq!(fixture.tables.pair_count() as u64, N);
        assert_eq!(fixture.tables.result_count() as u64, N);

        let snapshot = fixture.dispatcher.metrics().snapshot();
        assert_eq!(snapshot.received, N);
        assert_eq!(snapshot.persisted, N);
        assert_eq!(snapshot.persistence_failures, 0);

        // Every result row extends exactly one raw pair.
        let pairs: HashSet<(u64, u64)> = fixture
            .store
            .raw_pairs()
            .unwrap()
            .iter()
            .map(|p| (p.sender_ts, p.receiver_ts))
            .collect();
        let senders: HashSet<u64> = fixture
            .store
            .result_rows()
            .unwrap()
            .iter()
            .map(|row| {
                assert!(pairs.contains(&(row.sender_ts, row.receiver_ts)));
                row.sender_ts
            })
            .collect();
        assert_eq!(senders, (10_000..10_000 + N).collect());
    }

    #[tokio::test]
    async fn test_undecodable_message_rejected_at_hub() {
        let fixture = RelayFixture::new(
            Arc::new(ManualTimeSource::new(1050)),
            Arc::new(ManualTimeSource::new(1060)),
        );

        // Already stamped on the wire: the dispatcher refuses it.
        let mut stamped = Envelope::new(1000);
        stamped.stamp_received(1010).unwrap();
        fixture
            .hub
            .publish(OUTPUT_QUEUE, stamped, ConfirmationContext(0))
            .unwrap()
            .await;
        fixture.settle(1).await;

        assert_eq!(fixture.hub.stats().rejected, 1);
        assert_eq!(fixture.tables.pair_count(), 0);
    }
}
