use std::time::Duration;

use serde::Serialize;

use crate::application::{ActivationOutcome, AppResult, Clock, TimerStore};
use crate::domain::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActivationResult {
    Started,
    StillCooling { remaining_seconds: u64 },
}

impl ActivationResult {
    pub fn remaining(&self) -> Duration {
        match self {
            ActivationResult::Started => Duration::ZERO,
            ActivationResult::StillCooling { remaining_seconds } => {
                Duration::from_secs(*remaining_seconds)
            }
        }
    }
}

pub struct RequestActivationUseCase<'a> {
    pub store: &'a TimerStore,
    pub clock: &'a dyn Clock,
}

impl<'a> RequestActivationUseCase<'a> {
    pub async fn execute(&self, user_id: UserId, action_name: &str) -> AppResult<ActivationResult> {
        let now = self.clock.now();
        match self.store.try_activate(user_id, action_name, now).await? {
            ActivationOutcome::Started(_) => Ok(ActivationResult::Started),
            ActivationOutcome::StillCooling { remaining } => Ok(ActivationResult::StillCooling {
                remaining_seconds: remaining.as_secs(),
            }),
        }
    }
}
