//! # Transport Publisher
//!
//! Defines the `TransportClient` port and the in-memory hub that implements
//! it.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ConfirmationContext, Disposition, Envelope, SendResult};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::connection::ConnectionString;
use crate::error::TransportError;
use crate::message::{Confirmation, MessageProperties, TransportMessage};
use crate::subscriber::{HandlerRegistry, MessageHandler};
use crate::{DEFAULT_MESSAGE_TIMEOUT_MS, PROTOCOL};

/// PEM marker required in a trusted-certificate bundle.
const PEM_CERTIFICATE_MARKER: &str = "-----BEGIN CERTIFICATE-----";

/// Asynchronous publish/subscribe channel used by the relay.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Publish an envelope on an output queue.
    ///
    /// Returns immediately. The returned future resolves exactly once, at
    /// some later time, to the confirmation for this call.
    fn publish(
        &self,
        queue: &str,
        envelope: Envelope,
        context: ConfirmationContext,
    ) -> Result<PendingConfirmation, TransportError>;

    /// Bind a handler to an input queue.
    fn subscribe(&self, queue: &str, handler: Arc<dyn MessageHandler>)
        -> Result<(), TransportError>;

    /// Install a PEM bundle as trusted certificates.
    fn set_trusted_certs(&self, pem: &str) -> Result<(), TransportError>;

    /// Set the time in milliseconds until a published message times out.
    fn set_message_timeout(&self, timeout_ms: u64);

    /// Resolves when the transport hits a runtime fault.
    async fn faulted(&self) -> TransportError;

    /// Name of the wire protocol underneath.
    fn protocol(&self) -> &'static str {
        PROTOCOL
    }
}

/// Confirmation of a single publish, resolved exactly once.
///
/// If the transport drops the confirmation without answering, the future
/// resolves to a `SendResult::TransportError`.
#[must_use = "a publish confirmation should be awaited or handed to a tracker"]
pub struct PendingConfirmation {
    envelope: Envelope,
    context: ConfirmationContext,
    properties: MessageProperties,
    receiver: oneshot::Receiver<Confirmation>,
}

impl PendingConfirmation {
    /// Create a pending confirmation and the sender that completes it.
    pub fn channel(
        envelope: Envelope,
        context: ConfirmationContext,
        properties: MessageProperties,
    ) -> (oneshot::Sender<Confirmation>, Self) {
        let (tx, receiver) = oneshot::channel();
        (
            tx,
            Self {
                envelope,
                context,
                properties,
                receiver,
            },
        )
    }

    pub fn context(&self) -> ConfirmationContext {
        self.context
    }
}

impl Future for PendingConfirmation {
    type Output = Confirmation;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(confirmation)) => Poll::Ready(confirmation),
            Poll::Ready(Err(_)) => Poll::Ready(Confirmation {
                envelope: this.envelope,
                result: SendResult::TransportError("confirmation dropped".to_string()),
                context: this.context,
                properties: std::mem::take(&mut this.properties),
            }),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Snapshot of hub traffic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub failed: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub abandoned: u64,
}

#[derive(Default)]
struct HubCounters {
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    abandoned: AtomicU64,
}

impl HubCounters {
    fn record_disposition(&self, disposition: Disposition) {
        let counter = match disposition {
            Disposition::Accepted => &self.accepted,
            Disposition::Rejected => &self.rejected,
            Disposition::Abandoned => &self.abandoned,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> HubStats {
        HubStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

struct HubInner {
    /// Output queue -> input queue.
    routes: RwLock<HashMap<String, String>>,
    handlers: HandlerRegistry,
    trusted_certs: RwLock<Option<String>>,
    message_timeout_ms: AtomicU64,
    closed: AtomicBool,
    fault: watch::Sender<Option<String>>,
    counters: HubCounters,
}

/// In-process transport hub with edge-hub style routes.
///
/// Every `publish` is handed to a spawned delivery task: the task confirms
/// the publish, then invokes the handler bound to the routed input queue.
/// Deliveries of different messages run concurrently.
#[derive(Clone)]
pub struct InMemoryTransport {
    inner: Arc<HubInner>,
    module_id: Option<String>,
}

impl InMemoryTransport {
    /// Create a hub with no routes.
    #[must_use]
    pub fn new() -> Self {
        let (fault, _) = watch::channel(None);
        Self {
            inner: Arc::new(HubInner {
                routes: RwLock::new(HashMap::new()),
                handlers: HandlerRegistry::new(),
                trusted_certs: RwLock::new(None),
                message_timeout_ms: AtomicU64::new(DEFAULT_MESSAGE_TIMEOUT_MS),
                closed: AtomicBool::new(false),
                fault,
                counters: HubCounters::default(),
            }),
            module_id: None,
        }
    }

    /// Create a hub for the module named in a connection string.
    #[must_use]
    pub fn connect(connection: &ConnectionString) -> Self {
        info!(
            endpoint = %connection.endpoint(),
            device_id = %connection.device_id,
            module_id = %connection.module_id,
            protocol = PROTOCOL,
            "[bus] Transport client created"
        );
        Self {
            module_id: Some(connection.module_id.clone()),
            ..Self::new()
        }
    }

    /// A client handle for another module sharing this hub.
    #[must_use]
    pub fn for_module(&self, module_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            module_id: Some(module_id.into()),
        }
    }

    /// Route messages published on `output` to the `input` queue.
    pub fn route(&self, output: &str, input: &str) {
        self.inner
            .routes
            .write()
            .insert(output.to_string(), input.to_string());
        debug!(output = output, input = input, "[bus] Route added");
    }

    /// Input queue `output` is routed to.
    pub fn route_for(&self, output: &str) -> Option<String> {
        self.inner.routes.read().get(output).cloned()
    }

    pub fn module_id(&self) -> Option<&str> {
        self.module_id.as_deref()
    }

    /// Currently installed trusted-certificate bundle.
    pub fn trusted_certs(&self) -> Option<String> {
        self.inner.trusted_certs.read().clone()
    }

    pub fn message_timeout_ms(&self) -> u64 {
        self.inner.message_timeout_ms.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> HubStats {
        self.inner.counters.snapshot()
    }

    /// Signal a runtime fault (e.g. connectivity loss). Later publishes
    /// are confirmed with a transport error.
    pub fn inject_fault(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(reason = %reason, "[bus] Transport fault");
        self.inner.fault.send_replace(Some(reason));
    }

    /// Stop accepting messages. Later publishes are confirmed with a
    /// transport error.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        info!("[bus] Transport closed");
    }

    fn rejection_reason(&self) -> Option<String> {
        if let Some(reason) = self.inner.fault.borrow().clone() {
            return Some(format!("transport faulted: {}", reason));
        }
        if self.inner.closed.load(Ordering::SeqCst) {
            return Some("transport closed".to_string());
        }
        None
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportClient for InMemoryTransport {
    fn publish(
        &self,
        queue: &str,
        envelope: Envelope,
        context: ConfirmationContext,
    ) -> Result<PendingConfirmation, TransportError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let message = TransportMessage::from_envelope(&envelope, queue)?;
        let (confirm_tx, pending) =
            PendingConfirmation::channel(envelope, context, message.properties().clone());

        let inner = Arc::clone(&self.inner);
        let rejection = self.rejection_reason();
        let output = queue.to_string();

        runtime.spawn(async move {
            let properties = message.properties().clone();

            if let Some(reason) = rejection {
                inner.counters.failed.fetch_add(1, Ordering::Relaxed);
                let _ = confirm_tx.send(Confirmation {
                    envelope,
                    result: SendResult::TransportError(reason),
                    context,
                    properties,
                });
                return;
            }

            inner.counters.published.fetch_add(1, Ordering::Relaxed);
            let _ = confirm_tx.send(Confirmation {
                envelope,
                result: SendResult::Delivered,
                context,
                properties,
            });

            let input = inner.routes.read().get(&output).cloned();
            let handler = input.as_deref().and_then(|q| inner.handlers.get(q));
            match (input, handler) {
                (Some(input), Some(handler)) => {
                    inner.counters.delivered.fetch_add(1, Ordering::Relaxed);
                    let disposition = handler.handle(message).await;
                    inner.counters.record_disposition(disposition);
                    debug!(
                        output = %output,
                        input = %input,
                        disposition = %disposition,
                        "[bus] Message delivered"
                    );
                }
                (input, _) => {
                    inner.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        output = %output,
                        input = ?input,
                        "[bus] No handler for message, dropped"
                    );
                }
            }
        });

        Ok(pending)
    }

    fn subscribe(
        &self,
        queue: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), TransportError> {
        self.inner.handlers.register(queue, handler)?;
        info!(
            queue = queue,
            module_id = ?self.module_id,
            "[bus] Message callback set"
        );
        Ok(())
    }

    fn set_trusted_certs(&self, pem: &str) -> Result<(), TransportError> {
        if !pem.contains(PEM_CERTIFICATE_MARKER) {
            return Err(TransportError::TrustedCerts(
                "no PEM certificate block found".to_string(),
            ));
        }
        *self.inner.trusted_certs.write() = Some(pem.to_string());
        Ok(())
    }

    fn set_message_timeout(&self, timeout_ms: u64) {
        self.inner
            .message_timeout_ms
            .store(timeout_ms, Ordering::Relaxed);
    }

    async fn faulted(&self) -> TransportError {
        let mut fault = self.inner.fault.subscribe();
        loop {
            if let Some(reason) = fault.borrow_and_update().clone() {
                return TransportError::Faulted(reason);
            }
            if fault.changed().await.is_err() {
                return TransportError::Closed;
            }
        }
    }
}
