use async_trait::async_trait;

use crate::application::{AppResult, Notifier};
use crate::domain::ExpiryNotice;

pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notice: &ExpiryNotice) -> AppResult<()> {
        println!(
            "NOTIFY: user={} action={} fired_at={} {}",
            notice.user_id, notice.action_name, notice.fired_at, notice.text
        );
        Ok(())
    }
}
