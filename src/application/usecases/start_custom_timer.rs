use serde::{Deserialize, Serialize};

use crate::application::{AppError, AppResult, Clock, TimerStore};
use crate::domain::{CustomDuration, UserId};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomTimerRequest {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomTimerStarted {
    pub action_name: String,
    pub duration_seconds: u64,
    pub fire_at: i64,
}

pub struct StartCustomTimerUseCase<'a> {
    pub store: &'a TimerStore,
    pub clock: &'a dyn Clock,
}

impl<'a> StartCustomTimerUseCase<'a> {
    /// Zero or overflowing durations are rejected before anything is written.
    pub async fn execute(&self, user_id: UserId, req: &CustomTimerRequest) -> AppResult<CustomTimerStarted> {
        let duration = CustomDuration::new(req.days, req.hours, req.minutes, req.seconds)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let record = self
            .store
            .activate_custom(user_id, duration, self.clock.now())
            .await?;

        Ok(CustomTimerStarted {
            fire_at: record.expires_at(self.store.catalog()),
            action_name: record.action_name,
            duration_seconds: duration.total_secs(),
        })
    }
}
