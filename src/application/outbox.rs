use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::application::{AppError, AppResult};
use crate::domain::{PendingNotification, TimerKey, Timestamp, UserId};

/// In-memory queue of expiry notifications, at most one per (user, action).
///
/// Not durable: after a restart it is rebuilt from the persisted timers.
#[derive(Default)]
pub struct NotificationOutbox {
    entries: Mutex<HashMap<TimerKey, PendingNotification>>,
    next_id: AtomicU64,
}

impl NotificationOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an entry with a fresh id; does not enqueue it.
    pub fn prepare(&self, user_id: UserId, action_name: &str, fire_at: Timestamp) -> PendingNotification {
        PendingNotification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id,
            action_name: action_name.to_string(),
            fire_at,
            delivered: false,
        }
    }

    /// Insert, replacing any entry for the same key. Returns the superseded one.
    pub fn enqueue(&self, notification: PendingNotification) -> AppResult<Option<PendingNotification>> {
        let mut entries = self.lock()?;
        Ok(entries.insert(notification.key(), notification))
    }

    pub fn cancel(&self, user_id: UserId, action_name: &str) -> AppResult<Option<PendingNotification>> {
        let mut entries = self.lock()?;
        Ok(entries.remove(&TimerKey::new(user_id, action_name)))
    }

    pub fn get(&self, key: &TimerKey) -> AppResult<Option<PendingNotification>> {
        let entries = self.lock()?;
        Ok(entries.get(key).cloned())
    }

    /// Snapshot of entries due at `now`, oldest first.
    pub fn due(&self, now: Timestamp) -> AppResult<Vec<PendingNotification>> {
        let entries = self.lock()?;
        let mut due: Vec<PendingNotification> =
            entries.values().filter(|p| p.is_due(now)).cloned().collect();
        due.sort_by_key(|p| (p.fire_at, p.id));
        Ok(due)
    }

    /// Remove the entry for `key` only if it is still the one with `id`.
    pub fn settle(&self, key: &TimerKey, id: u64) -> AppResult<bool> {
        let mut entries = self.lock()?;
        if entries.get(key).map(|p| p.id) != Some(id) {
            return Ok(false);
        }
        entries.remove(key);
        tracing::debug!(key = %key, id, "pending notification settled");
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<TimerKey, PendingNotification>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_supersedes_same_key() {
        let outbox = NotificationOutbox::new();
        let first = outbox.prepare(UserId(1), "Moto", 100);
        let second = outbox.prepare(UserId(1), "Moto", 200);
        assert_ne!(first.id, second.id);

        assert!(outbox.enqueue(first.clone()).unwrap().is_none());
        let replaced = outbox.enqueue(second.clone()).unwrap();
        assert_eq!(replaced, Some(first));
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.get(&second.key()).unwrap(), Some(second));
    }

    #[test]
    fn settle_ignores_superseded_id() {
        let outbox = NotificationOutbox::new();
        let old = outbox.prepare(UserId(1), "Moto", 100);
        let new = outbox.prepare(UserId(1), "Moto", 200);
        outbox.enqueue(new.clone()).unwrap();

        assert!(!outbox.settle(&old.key(), old.id).unwrap());
        assert_eq!(outbox.len(), 1);
        assert!(outbox.settle(&new.key(), new.id).unwrap());
        assert!(outbox.is_empty());
    }

    #[test]
    fn due_filters_by_fire_at() {
        let outbox = NotificationOutbox::new();
        outbox.enqueue(outbox.prepare(UserId(1), "a", 50)).unwrap();
        outbox.enqueue(outbox.prepare(UserId(2), "b", 10)).unwrap();
        outbox.enqueue(outbox.prepare(UserId(3), "c", 500)).unwrap();

        let due = outbox.due(60).unwrap();
        let names: Vec<&str> = due.iter().map(|p| p.action_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn cancel_removes_entry() {
        let outbox = NotificationOutbox::new();
        outbox.enqueue(outbox.prepare(UserId(1), "Moto", 100)).unwrap();
        assert!(outbox.cancel(UserId(1), "Moto").unwrap().is_some());
        assert!(outbox.cancel(UserId(1), "Moto").unwrap().is_none());
    }
}
