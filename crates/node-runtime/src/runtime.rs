//! # Relay Runtime
//!
//! Drives one relay process through its lifecycle:
//!
//! ```text
//! new ──→ start ──→ wait ──────────────→ shutdown
//!          │         ├─ Ctrl+C            │ 1. signal producer
//!          │         ├─ transport fault   │ 2. await producer summary
//!          │         └─ request_shutdown  │ 3. drain confirmations
//!          ├─ subscribe dispatcher        │ 4. close transport
//!          └─ spawn producer loop         │ 5. export counters
//!                                         └─ "relay stopped"
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lr_01_producer::{ProducerError, ProducerSummary};
use parking_lot::Mutex;
use relay_telemetry::{encode_metrics, RelayCounters};
use shared_bus::{MessageHandler, TransportClient, TransportError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::container::RelayContainer;
use crate::error::RelayError;

/// Why `wait` returned.
#[derive(Debug)]
pub enum StopReason {
    /// Ctrl+C from the terminal or the container runtime.
    Interrupted,
    /// The transport reported a runtime fault.
    TransportFault(TransportError),
    /// `request_shutdown` was called.
    ShutdownRequested,
}

impl StopReason {
    /// Whether the transport faulted. A fault is still a controlled
    /// shutdown: the process returns normally rather than retrying.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::TransportFault(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => write!(f, "interrupted"),
            Self::TransportFault(e) => write!(f, "transport fault: {e}"),
            Self::ShutdownRequested => write!(f, "shutdown requested"),
        }
    }
}

type ProducerTask = JoinHandle<Result<ProducerSummary, ProducerError>>;

/// The relay process runtime.
pub struct RelayRuntime {
    container: Arc<RelayContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    producer_task: Mutex<Option<ProducerTask>>,
    started: AtomicBool,
}

impl RelayRuntime {
    pub fn new(container: RelayContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            producer_task: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    /// Subscribe the dispatcher and spawn the producer loop.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&self) -> Result<(), RelayError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(RelayError::AlreadyStarted);
        }

        let config = &self.container.config;
        info!("===========================================");
        info!("  Latency Relay v{}", env!("CARGO_PKG_VERSION"));
        info!("  Service: {}", config.telemetry.service_name);
        info!("  Module: {}", config.connection.module_id);
        info!("  Role: {}", config.role);
        info!("  Protocol: {}", self.container.transport.protocol());
        info!("===========================================");

        if let Some(dispatcher) = &self.container.dispatcher {
            let handler: Arc<dyn MessageHandler> = dispatcher.clone();
            self.container
                .transport
                .subscribe(&config.consumer.input_queue, handler)?;
            info!(queue = %config.consumer.input_queue, "Consumer dispatcher subscribed");
        }

        if let Some(producer) = &self.container.producer {
            let producer = Arc::clone(producer);
            let shutdown = self.shutdown_rx.clone();
            let task = tokio::spawn(async move { producer.run(shutdown).await });
            *self.producer_task.lock() = Some(task);
            info!(queue = %config.producer.output_queue, "Producer loop started");
        }

        info!("Relay is running. Press Ctrl+C to stop.");
        Ok(())
    }

    /// Wait until the relay should stop.
    pub async fn wait(&self) -> StopReason {
        let mut shutdown = self.shutdown_rx.clone();

        tokio::select! {
            _ = interrupted() => {
                info!("Interrupt received");
                StopReason::Interrupted
            }
            fault = self.container.transport.faulted() => {
                error!(error = %fault, "Transport fault");
                StopReason::TransportFault(fault)
            }
            _ = shutdown_requested(&mut shutdown) => StopReason::ShutdownRequested,
        }
    }

    /// Start, wait for a stop condition, then shut down.
    ///
    /// Every stop condition, a transport fault included, ends in a graceful
    /// shutdown and `Ok`.
    pub async fn run(&self) -> Result<StopReason, RelayError> {
        self.start()?;

        let reason = self.wait().await;
        if reason.is_fault() {
            error!(reason = %reason, "Stopping relay");
        } else {
            info!(reason = %reason, "Stopping relay");
        }

        self.shutdown().await?;
        Ok(reason)
    }

    /// Ask a running `wait` to return.
    pub fn request_shutdown(&self) {
        // No receivers only means nothing is waiting.
        let _ = self.shutdown_tx.send(true);
    }

    /// Stop the producer, close the transport and export the counters.
    pub async fn shutdown(&self) -> Result<RelayCounters, RelayError> {
        info!("Initiating graceful shutdown...");
        self.request_shutdown();

        let task = self.producer_task.lock().take();
        if let Some(task) = task {
            match task.await {
                Ok(summary) => {
                    let summary = summary?;
                    info!(
                        sent = summary.sent,
                        confirmed = summary.confirmed,
                        failed = summary.failed,
                        state = %summary.state,
                        "Producer summary"
                    );
                }
                Err(e) => error!(error = %e, "Producer task aborted"),
            }
        }

        // Confirmations may still be in flight after the loop returns.
        if let Some(producer) = &self.container.producer {
            let bound = Duration::from_millis(self.container.config.message_timeout_ms);
            producer.drain_confirmations(bound).await;
        }

        self.container.transport.close();

        let counters = self.counters();
        counters.export();
        match encode_metrics() {
            Ok(text) => debug!("Final metrics:\n{}", text),
            Err(e) => warn!(error = %e, "Could not encode metrics"),
        }

        info!(
            published = counters.published,
            confirmed = counters.confirmed,
            received = counters.received,
            persisted = counters.persisted,
            "relay stopped"
        );
        Ok(counters)
    }

    /// Snapshot of the process-lifetime counters.
    pub fn counters(&self) -> RelayCounters {
        let mut counters = RelayCounters::default();

        if let Some(producer) = &self.container.producer {
            counters.published = producer.metrics().get_published();
            counters.confirmed = producer.tracker().confirmed();
            counters.confirmation_failures = producer.tracker().failed();
        }
        if let Some(dispatcher) = &self.container.dispatcher {
            let snapshot = dispatcher.metrics().snapshot();
            counters.received = snapshot.received;
            counters.persisted = snapshot.persisted;
            counters.persistence_failures = snapshot.persistence_failures;
            counters.decode_failures = snapshot.decode_failures;
        }

        counters
    }

    pub fn container(&self) -> Arc<RelayContainer> {
        Arc::clone(&self.container)
    }
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Resolves once the shutdown flag is true.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
