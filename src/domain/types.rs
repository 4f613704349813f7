use std::fmt;

use serde::{Deserialize, Serialize};

/// Unix epoch seconds.
pub type Timestamp = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// SQLite has no unsigned 64-bit column type; chat platform ids fit in i63.
    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }

    pub fn from_i64(v: i64) -> Self {
        Self(v as u64)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a timer: one live record per (user, action).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerKey {
    pub user_id: UserId,
    pub action_name: String,
}

impl TimerKey {
    pub fn new(user_id: UserId, action_name: impl Into<String>) -> Self {
        Self {
            user_id,
            action_name: action_name.into(),
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.action_name)
    }
}
