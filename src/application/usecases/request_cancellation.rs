use serde::Serialize;

use crate::application::{AppResult, TimerStore};
use crate::domain::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CancellationResult {
    Cancelled,
    NotFound,
}

pub struct RequestCancellationUseCase<'a> {
    pub store: &'a TimerStore,
}

impl<'a> RequestCancellationUseCase<'a> {
    pub async fn execute(&self, user_id: UserId, action_name: &str) -> AppResult<CancellationResult> {
        if self.store.deactivate(user_id, action_name).await? {
            Ok(CancellationResult::Cancelled)
        } else {
            Ok(CancellationResult::NotFound)
        }
    }
}
