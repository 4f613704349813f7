use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Timestamp, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    ActionUsed,
    CustomTimer,
    TimerDeleted,
    NotificationSent,
    NotificationFailed,
    NotificationDismissed,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::ActionUsed => "action_used",
            AuditKind::CustomTimer => "custom_timer",
            AuditKind::TimerDeleted => "timer_deleted",
            AuditKind::NotificationSent => "notification_sent",
            AuditKind::NotificationFailed => "notification_failed",
            AuditKind::NotificationDismissed => "notification_dismissed",
        }
    }

    /// Accepts the current names and the event types the old bot wrote.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "action_used"
            | "Использование действия"
            | "Использование задания"
            | "Оплата имущества" => Some(AuditKind::ActionUsed),
            "custom_timer" | "Кастомный таймер" => Some(AuditKind::CustomTimer),
            "timer_deleted" | "Таймер удалён" => Some(AuditKind::TimerDeleted),
            "notification_sent" => Some(AuditKind::NotificationSent),
            "notification_failed" => Some(AuditKind::NotificationFailed),
            "notification_dismissed" => Some(AuditKind::NotificationDismissed),
            _ => None,
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: AuditKind,
    pub user_id: UserId,
    pub action_name: Option<String>,
    pub detail: Option<String>,
}

impl AuditEntry {
    /// `at` is epoch seconds from the caller's clock.
    pub fn new(kind: AuditKind, user_id: UserId, at: Timestamp) -> Self {
        Self {
            timestamp: DateTime::from_timestamp(at, 0).unwrap_or_default(),
            kind,
            user_id,
            action_name: None,
            detail: None,
        }
    }

    pub fn action(mut self, action_name: impl Into<String>) -> Self {
        self.action_name = Some(action_name.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
