use std::sync::Arc;
use std::time::Duration;

use crate::application::usecases::{RunScanUseCase, ScanReport};
use crate::application::{AppResult, Clock, Notifier, TimerStore};

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Background loop that fires expiry notifications.
pub struct ExpiryScheduler {
    store: Arc<TimerStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    delivery_timeout: Duration,
}

impl ExpiryScheduler {
    pub fn new(store: Arc<TimerStore>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            notifier,
            clock,
            interval: DEFAULT_SCAN_INTERVAL,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub async fn scan_once(&self) -> AppResult<ScanReport> {
        RunScanUseCase {
            store: &self.store,
            notifier: self.notifier.as_ref(),
            clock: self.clock.as_ref(),
            delivery_timeout: self.delivery_timeout,
        }
        .execute()
        .await
    }

    /// Runs until the task is dropped.
    pub async fn run(self) {
        tracing::info!(interval = ?self.interval, "expiry scheduler started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.scan_once().await {
                Ok(r) if r.due > 0 => tracing::info!(
                    due = r.due,
                    delivered = r.delivered,
                    failed = r.failed,
                    skipped = r.skipped,
                    "expiry scan"
                ),
                Ok(_) => {}
                Err(e) => tracing::error!("expiry scan failed: {e}"),
            }
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
