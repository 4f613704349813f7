use crate::application::{AppResult, TimerStore};
use crate::domain::UserId;

pub struct DismissNotificationUseCase<'a> {
    pub store: &'a TimerStore,
}

impl<'a> DismissNotificationUseCase<'a> {
    /// Returns whether a still-pending entry was cancelled.
    pub async fn execute(&self, user_id: UserId, action_name: &str) -> AppResult<bool> {
        self.store.dismiss(user_id, action_name).await
    }
}
