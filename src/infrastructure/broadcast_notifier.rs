use async_trait::async_trait;

use crate::application::{AppResult, Notifier};
use crate::domain::ExpiryNotice;
use crate::infrastructure::event_bus::EventBus;

/// Feeds the live notification stream. Best effort: with nobody subscribed
/// the notice is simply dropped.
pub struct BroadcastNotifier {
    bus: EventBus,
}

impl BroadcastNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn notify(&self, notice: &ExpiryNotice) -> AppResult<()> {
        let receivers = self.bus.publish(notice.clone());
        tracing::debug!(receivers, user_id = %notice.user_id, "notice broadcast");
        Ok(())
    }
}
