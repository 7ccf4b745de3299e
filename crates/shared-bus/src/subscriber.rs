//! # Message Subscriber
//!
//! Defines the receiving side of the transport: handlers bound to named
//! input queues.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Disposition;
use tracing::debug;

use crate::error::TransportError;
use crate::message::TransportMessage;

/// Handler invoked for every message delivered on its input queue.
///
/// Invocations may overlap; implementations must be safe to call
/// concurrently.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Process one message and tell the transport how to finalize it.
    async fn handle(&self, message: TransportMessage) -> Disposition;
}

/// One handler per input queue.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn MessageHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `queue`. A queue keeps its first handler.
    pub fn register(
        &self,
        queue: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), TransportError> {
        let mut handlers = self.handlers.write();
        if handlers.contains_key(queue) {
            return Err(TransportError::AlreadySubscribed(queue.to_string()));
        }
        handlers.insert(queue.to_string(), handler);
        debug!(queue = queue, "Message handler registered");
        Ok(())
    }

    /// Handler bound to `queue`, if any.
    pub fn get(&self, queue: &str) -> Option<Arc<dyn MessageHandler>> {
        self.handlers.read().get(queue).cloned()
    }

    pub fn is_registered(&self, queue: &str) -> bool {
        self.handlers.read().contains_key(queue)
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}
