use std::time::Duration;

use crate::application::{AppError, AppResult, Clock, Notifier, TimerStore};
use crate::domain::{AuditEntry, AuditKind, ExpiryNotice};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub due: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Cancelled or superseded between snapshot and delivery.
    pub skipped: usize,
}

/// One pass over the outbox: deliver everything due, keep failures for the
/// next pass.
pub struct RunScanUseCase<'a> {
    pub store: &'a TimerStore,
    pub notifier: &'a dyn Notifier,
    pub clock: &'a dyn Clock,
    pub delivery_timeout: Duration,
}

impl<'a> RunScanUseCase<'a> {
    pub async fn execute(&self) -> AppResult<ScanReport> {
        let now = self.clock.now();
        let outbox = self.store.outbox();
        let due = outbox.due(now)?;
        let mut report = ScanReport {
            due: due.len(),
            ..ScanReport::default()
        };

        for snapshot in due {
            let key = snapshot.key();
            // same lock deactivate/activate take: re-read under it so a
            // concurrent cancel or supersede is never delivered
            let _guard = self.store.locks().lock(&key).await;

            let Some(pending) = outbox.get(&key)? else {
                report.skipped += 1;
                continue;
            };
            if pending.id != snapshot.id || !pending.is_due(now) {
                report.skipped += 1;
                continue;
            }

            let notice = ExpiryNotice::for_pending(&pending, now);
            let result = match tokio::time::timeout(self.delivery_timeout, self.notifier.notify(&notice)).await {
                Ok(r) => r,
                Err(_) => Err(AppError::Notifier(format!(
                    "delivery timed out after {:?}",
                    self.delivery_timeout
                ))),
            };

            match result {
                Ok(()) => {
                    outbox.settle(&key, pending.id)?;
                    report.delivered += 1;
                    self.store
                        .record(
                            AuditEntry::new(AuditKind::NotificationSent, pending.user_id, now)
                                .action(&pending.action_name),
                        )
                        .await;
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(key = %key, error = %e, "notification delivery failed, will retry");
                    self.store
                        .record(
                            AuditEntry::new(AuditKind::NotificationFailed, pending.user_id, now)
                                .action(&pending.action_name)
                                .detail(e.to_string()),
                        )
                        .await;
                }
            }
        }

        Ok(report)
    }
}
