use async_trait::async_trait;
use serde::Serialize;

use crate::application::{AppError, AppResult, Notifier};
use crate::domain::ExpiryNotice;

/// POSTs each notice as JSON; the receiving service messages the user.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    user_id: u64,
    action_name: &'a str,
    text: &'a str,
    fired_at: i64,
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: &ExpiryNotice) -> AppResult<()> {
        let payload = WebhookPayload {
            user_id: notice.user_id.0,
            action_name: &notice.action_name,
            text: &notice.text,
            fired_at: notice.fired_at,
        };

        self.client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notifier(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Notifier(e.to_string()))?;

        Ok(())
    }
}
