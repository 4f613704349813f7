use async_trait::async_trait;

use crate::application::{AppResult, Notifier};
use crate::domain::ExpiryNotice;

pub struct MultiNotifier {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl MultiNotifier {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    async fn notify(&self, notice: &ExpiryNotice) -> AppResult<()> {
        // every channel gets a try; any failure keeps the entry for retry
        let mut last_err = None;

        for n in &self.notifiers {
            if let Err(e) = n.notify(notice).await {
                tracing::warn!(error = %e, user_id = %notice.user_id, "notifier channel failed");
                last_err = Some(e);
            }
        }

        if let Some(e) = last_err {
            return Err(e);
        }

        Ok(())
    }
}
