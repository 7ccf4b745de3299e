//! # Component Container
//!
//! Builds the relay components in dependency order:
//!
//! ```text
//! Level 0: Transport (options, trust material, routes)
//! Level 1: Latency Store                    (receiver role)
//! Level 2: Consumer Dispatcher, Producer    (by role)
//! ```

use std::sync::Arc;

use lr_01_producer::ProducerLoop;
use lr_02_consumer::ConsumerDispatcher;
use lr_03_latency_store::LatencyStore;
use shared_bus::{InMemoryTransport, TransportClient};
use shared_types::SystemTimeSource;
use tracing::{info, warn};

use crate::adapters::{install_trusted_certs, open_store};
use crate::container::config::{RelayConfig, Role};
use crate::error::RelayError;

/// Holds the relay components for one process.
pub struct RelayContainer {
    pub config: RelayConfig,
    pub transport: Arc<InMemoryTransport>,
    pub store: Option<Arc<dyn LatencyStore>>,
    pub producer: Option<Arc<ProducerLoop>>,
    pub dispatcher: Option<Arc<ConsumerDispatcher>>,
}

impl RelayContainer {
    /// Connect a transport for the configured module and build the rest.
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let transport = Arc::new(InMemoryTransport::connect(&config.connection));
        if config.role == Role::Sender {
            warn!(
                queue = %config.producer.output_queue,
                "No receiver on this hub; published messages will be dropped"
            );
        }
        Self::with_transport(config, transport)
    }

    /// Build on an existing transport (e.g. a hub shared with another
    /// module in the same process).
    pub fn with_transport(
        config: RelayConfig,
        transport: Arc<InMemoryTransport>,
    ) -> Result<Self, RelayError> {
        info!(role = %config.role, "Building relay components");

        // Level 0: transport options, before any publish/subscribe
        transport.set_message_timeout(config.message_timeout_ms);
        info!(
            timeout_ms = config.message_timeout_ms,
            "Message timeout set"
        );
        if let Some(path) = &config.ca_certificate_file {
            if let Err(e) = install_trusted_certs(transport.as_ref(), path) {
                warn!(error = %e, "Continuing without custom trust store");
            }
        }
        transport.route(&config.producer.output_queue, &config.consumer.input_queue);

        // Level 1-2: receiver side
        let (store, dispatcher) = if config.role.receives() {
            let store = open_store(&config)?;
            let dispatcher = Arc::new(ConsumerDispatcher::new(
                Arc::clone(&store),
                Arc::new(SystemTimeSource),
                config.consumer.clone(),
            ));
            (Some(store), Some(dispatcher))
        } else {
            (None, None)
        };

        // Level 2: sender side
        let producer = if config.role.sends() {
            Some(Arc::new(ProducerLoop::new(
                transport.clone(),
                Arc::new(SystemTimeSource),
                config.producer.clone(),
            )?))
        } else {
            None
        };

        Ok(Self {
            config,
            transport,
            store,
            producer,
            dispatcher,
        })
    }
}
