use tokio::sync::broadcast;

use crate::domain::ExpiryNotice;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ExpiryNotice>,
}

impl EventBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExpiryNotice> {
        self.tx.subscribe()
    }

    /// Number of subscribers that received the notice.
    pub fn publish(&self, notice: ExpiryNotice) -> usize {
        // no subscribers is reported as 0, slow ones may lag
        self.tx.send(notice).unwrap_or(0)
    }
}
