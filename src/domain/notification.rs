use serde::{Deserialize, Serialize};

use super::{TimerKey, Timestamp, UserId};

/// A scheduled "your cooldown is over" message for one activation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    /// Unique per activation; tells a superseded entry apart from the live one.
    pub id: u64,
    pub user_id: UserId,
    pub action_name: String,
    pub fire_at: Timestamp,
    pub delivered: bool,
}

impl PendingNotification {
    pub fn key(&self) -> TimerKey {
        TimerKey::new(self.user_id, self.action_name.clone())
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        !self.delivered && self.fire_at <= now
    }
}

/// What a delivery transport actually sends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryNotice {
    pub user_id: UserId,
    pub action_name: String,
    pub text: String,
    pub fired_at: Timestamp,
}

impl ExpiryNotice {
    pub fn for_pending(pending: &PendingNotification, fired_at: Timestamp) -> Self {
        Self {
            user_id: pending.user_id,
            action_name: pending.action_name.clone(),
            text: expiry_text(&pending.action_name),
            fired_at,
        }
    }
}

pub fn expiry_text(action_name: &str) -> String {
    match action_name {
        "Оплата на 29 дней" => {
            "🔔 Ваша оплата имущества на 29 дней завершена. Пора продлить!".to_string()
        }
        "Оплата на 6 дней" => {
            "🔔 Ваша оплата имущества на 6 дней завершена. Пора продлить!".to_string()
        }
        other => format!("🔔 Задание \"{}\" снова доступно!", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payments_get_renewal_text() {
        assert!(expiry_text("Оплата на 6 дней").contains("Пора продлить"));
        assert_eq!(
            expiry_text("Moto"),
            "🔔 Задание \"Moto\" снова доступно!".to_string()
        );
    }

    #[test]
    fn delivered_entry_is_never_due() {
        let mut p = PendingNotification {
            id: 1,
            user_id: UserId(7),
            action_name: "Moto".into(),
            fire_at: 10,
            delivered: false,
        };
        assert!(!p.is_due(9));
        assert!(p.is_due(10));
        p.delivered = true;
        assert!(!p.is_due(11));
    }
}
