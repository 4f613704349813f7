use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CooldownCatalog, TimerKey, Timestamp, UserId};

pub const CUSTOM_TIMER_PREFIX: &str = "Кастомный таймер";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub user_id: UserId,
    pub action_name: String,
    pub activated_at: Timestamp,
    /// Set for user-defined timers; overrides the catalog cooldown.
    pub custom_cooldown_secs: Option<u64>,
}

impl TimerRecord {
    pub fn key(&self) -> TimerKey {
        TimerKey::new(self.user_id, self.action_name.clone())
    }

    pub fn cooldown(&self, catalog: &CooldownCatalog) -> Duration {
        match self.custom_cooldown_secs {
            Some(secs) => Duration::from_secs(secs),
            None => catalog.cooldown_for(&self.action_name),
        }
    }

    pub fn expires_at(&self, catalog: &CooldownCatalog) -> Timestamp {
        super::expires_at(self.activated_at, self.cooldown(catalog))
    }
}

/// A user-chosen timer length. Always strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomDuration {
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CustomDurationError {
    #[error("timer duration must be greater than zero")]
    Zero,
    #[error("timer duration is too large")]
    Overflow,
}

impl CustomDuration {
    pub fn new(
        days: u64,
        hours: u64,
        minutes: u64,
        seconds: u64,
    ) -> Result<Self, CustomDurationError> {
        let d = Self {
            days,
            hours,
            minutes,
            seconds,
        };
        match d.checked_total() {
            None => Err(CustomDurationError::Overflow),
            Some(0) => Err(CustomDurationError::Zero),
            Some(total) if total > i64::MAX as u64 => Err(CustomDurationError::Overflow),
            Some(_) => Ok(d),
        }
    }

    pub fn from_secs(seconds: u64) -> Result<Self, CustomDurationError> {
        Self::new(0, 0, 0, seconds)
    }

    fn checked_total(&self) -> Option<u64> {
        self.days
            .checked_mul(86400)?
            .checked_add(self.hours.checked_mul(3600)?)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)
    }

    pub fn total_secs(&self) -> u64 {
        self.checked_total().unwrap_or(u64::MAX)
    }

    /// e.g. `Кастомный таймер (2 дн 5 ч 30 мин)`
    pub fn action_name(&self) -> String {
        let mut name = format!(
            "{} ({} дн {} ч {} мин",
            CUSTOM_TIMER_PREFIX, self.days, self.hours, self.minutes
        );
        if self.seconds > 0 {
            name.push_str(&format!(" {} сек", self.seconds));
        }
        name.push(')');
        name
    }
}
