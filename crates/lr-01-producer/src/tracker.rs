//! # Confirmation Tracker
//!
//! Counts publish confirmations. Confirmations arrive on arbitrary tasks in
//! arbitrary order, so the counters are atomics and never lose an update.

use std::sync::atomic::{AtomicU64, Ordering};

use shared_bus::Confirmation;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Process-lifetime confirmation counters.
#[derive(Debug, Default)]
pub struct ConfirmationTracker {
    confirmed: AtomicU64,
    failed: AtomicU64,
    notify: Notify,
}

impl ConfirmationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one confirmation and return the confirmed total.
    ///
    /// A transport error is logged and counted as failed; the confirmed
    /// total still advances since the publish call completed.
    pub fn record(&self, confirmation: &Confirmation) -> u64 {
        let total = self.confirmed.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            "Confirmation[{}] received for message with result = {}",
            confirmation.context, confirmation.result
        );
        info!(properties = ?confirmation.properties, "    Properties");
        info!(total = total, "    Total calls confirmed: {}", total);

        if !confirmation.result.is_delivered() {
            self.failed.fetch_add(1, Ordering::SeqCst);
            warn!(
                context = %confirmation.context,
                sender_ts = confirmation.envelope.sender_ts(),
                result = %confirmation.result,
                "[lr-01] Publish not delivered, no retry"
            );
        }

        self.notify.notify_waiters();
        total
    }

    /// Confirmations received so far, delivered or not.
    pub fn confirmed(&self) -> u64 {
        self.confirmed.load(Ordering::SeqCst)
    }

    /// Confirmations that reported a transport error.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` confirmations were recorded.
    pub async fn wait_for(&self, count: u64) {
        loop {
            let notified = self.notify.notified();
            if self.confirmed() >= count {
                return;
            }
            notified.await;
        }
    }
}
