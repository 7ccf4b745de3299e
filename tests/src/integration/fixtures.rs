//! Shared wiring for the integration tests.

use std::sync::Arc;

use lr_02_consumer::{ConsumerConfig, ConsumerDispatcher};
use lr_03_latency_store::{InMemoryLatencyStore, InMemoryTables, LatencyStoreService, StoreConfig};
use shared_bus::{InMemoryTransport, MessageHandler, TransportClient};
use shared_types::{TimeSource, INPUT_QUEUE, OUTPUT_QUEUE};

/// A routed hub with a dispatcher subscribed on the input queue.
pub struct RelayFixture {
    pub hub: InMemoryTransport,
    pub tables: Arc<InMemoryTables>,
    pub store: Arc<InMemoryLatencyStore>,
    pub dispatcher: Arc<ConsumerDispatcher>,
}

impl RelayFixture {
    /// `receive_clock` stamps receiver_ts, `persist_clock` stamps persisted_ts.
    pub fn new(receive_clock: Arc<dyn TimeSource>, persist_clock: Arc<dyn TimeSource>) -> Self {
        let hub = InMemoryTransport::new();
        hub.route(OUTPUT_QUEUE, INPUT_QUEUE);

        let tables = Arc::new(InMemoryTables::new());
        let store = Arc::new(LatencyStoreService::new(
            Arc::clone(&tables),
            persist_clock,
            StoreConfig::default(),
        ));
        let dispatcher = Arc::new(ConsumerDispatcher::new(
            store.clone(),
            receive_clock,
            ConsumerConfig::default(),
        ));

        let handler: Arc<dyn MessageHandler> = dispatcher.clone();
        hub.subscribe(INPUT_QUEUE, handler)
            .expect("subscribe on a fresh hub");

        Self {
            hub,
            tables,
            store,
            dispatcher,
        }
    }

    /// Wait until the hub has seen `count` handler dispositions.
    pub async fn settle(&self, count: u64) {
        for _ in 0..1_000 {
            let stats = self.hub.stats();
            if stats.accepted + stats.rejected + stats.abandoned >= count {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("hub did not settle at {count} dispositions: {:?}", self.hub.stats());
    }
}
