//! Producer loop implementation
//!
//! Drives the Sending/Idle state machine on tokio timers so that tests can
//! run it under paused time, and so a shutdown signal can interrupt any
//! sleep.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use shared_bus::TransportClient;
use shared_types::{ConfirmationContext, Envelope, TimeSource};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::ProducerConfig;
use crate::domain::ProducerState;
use crate::error::{ProducerError, Result};
use crate::metrics::ProducerMetrics;
use crate::tracker::ConfirmationTracker;

/// Counters at the time the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerSummary {
    pub sent: u64,
    pub confirmed: u64,
    pub failed: u64,
    pub state: ProducerState,
}

/// Publishes envelopes on a cadence up to a cap.
pub struct ProducerLoop {
    transport: Arc<dyn TransportClient>,
    time_source: Arc<dyn TimeSource>,
    config: ProducerConfig,

    /// Publish calls issued so far; gates the cap
    sent_count: AtomicU64,

    /// Current state
    state: RwLock<ProducerState>,

    /// Whether `run` is in progress
    is_active: AtomicBool,

    tracker: Arc<ConfirmationTracker>,
    metrics: Arc<ProducerMetrics>,
}

impl ProducerLoop {
    pub fn new(
        transport: Arc<dyn TransportClient>,
        time_source: Arc<dyn TimeSource>,
        config: ProducerConfig,
    ) -> Result<Self> {
        config.validate()?;

        info!("[lr-01] Initializing producer loop");
        info!("  Cap: {}", config.cap);
        info!("  Cadence: {:?}", config.cadence);
        info!("  Output queue: {}", config.output_queue);

        Ok(Self {
            transport,
            time_source,
            state: RwLock::new(ProducerState::for_count(0, config.cap)),
            config,
            sent_count: AtomicU64::new(0),
            is_active: AtomicBool::new(false),
            tracker: Arc::new(ConfirmationTracker::new()),
            metrics: Arc::new(ProducerMetrics::new()),
        })
    }

    pub fn state(&self) -> ProducerState {
        *self.state.read()
    }

    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    pub fn tracker(&self) -> &Arc<ConfirmationTracker> {
        &self.tracker
    }

    pub fn metrics(&self) -> &Arc<ProducerMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    pub fn summary(&self) -> ProducerSummary {
        ProducerSummary {
            sent: self.sent_count(),
            confirmed: self.tracker.confirmed(),
            failed: self.tracker.failed(),
            state: self.state(),
        }
    }

    /// Run until `shutdown` turns true (or its sender is dropped).
    ///
    /// Must be called inside a tokio runtime. Only one `run` may be in
    /// progress at a time.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<ProducerSummary> {
        if self.is_active.swap(true, Ordering::SeqCst) {
            return Err(ProducerError::AlreadyRunning);
        }
        info!("[lr-01] Starting producer loop");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let sent = self.sent_count();
            let state = ProducerState::for_count(sent, self.config.cap);
            self.transition(state);

            let pause = match state {
                ProducerState::Sending => {
                    self.send_one(sent);
                    self.config.cadence
                }
                ProducerState::Idle => {
                    self.metrics.record_idle_check();
                    self.config.idle_interval
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.is_active.store(false, Ordering::SeqCst);
        let summary = self.summary();
        info!(
            sent = summary.sent,
            confirmed = summary.confirmed,
            failed = summary.failed,
            "[lr-01] Producer loop stopped"
        );
        Ok(summary)
    }

    /// Wait up to `timeout` for every accepted publish to be confirmed.
    ///
    /// Returns `false` if confirmations were still outstanding when the
    /// timeout elapsed.
    pub async fn drain_confirmations(&self, timeout: Duration) -> bool {
        let expected = self.metrics.get_published();
        if tokio::time::timeout(timeout, self.tracker.wait_for(expected))
            .await
            .is_ok()
        {
            return true;
        }
        warn!(
            expected = expected,
            confirmed = self.tracker.confirmed(),
            "[lr-01] Confirmations still outstanding"
        );
        false
    }

    fn transition(&self, next: ProducerState) {
        let mut state = self.state.write();
        if *state != next {
            info!(
                from = %*state,
                to = %next,
                sent = self.sent_count(),
                "[lr-01] Producer state changed"
            );
            *state = next;
        }
    }

    /// Publish one envelope with `context = sent`. Does not wait for the
    /// confirmation.
    fn send_one(&self, sent: u64) {
        let envelope = Envelope::new(self.time_source.now());
        let context = ConfirmationContext(sent);

        info!(
            context = %context,
            sender_ts = envelope.sender_ts(),
            "[lr-01] Sending message"
        );

        match self
            .transport
            .publish(&self.config.output_queue, envelope, context)
        {
            Ok(pending) => {
                self.metrics.record_published();
                let tracker = Arc::clone(&self.tracker);
                tokio::spawn(async move {
                    let confirmation = pending.await;
                    tracker.record(&confirmation);
                });
            }
            Err(e) => {
                // Counted against the cap like any other publish; no retry.
                self.metrics.record_publish_error();
                error!(context = %context, error = %e, "[lr-01] Publish failed");
            }
        }

        self.sent_count.fetch_add(1, Ordering::SeqCst);
        debug!(sent = sent + 1, cap = self.config.cap, "[lr-01] Publish issued");
    }
}
