use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::{
    AppError, AppResult, AuditLog, Clock, KeyLocks, NotificationOutbox, TimerRepository,
};
use crate::domain::{
    AuditEntry, AuditKind, CooldownCatalog, CustomDuration, TimerKey, TimerRecord, Timestamp,
    UserId, remaining,
};

type Mirror = HashMap<UserId, BTreeMap<String, TimerRecord>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    Started(TimerRecord),
    StillCooling { remaining: Duration },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTimer {
    pub action_name: String,
    pub remaining_seconds: u64,
}

/// Authoritative timer state: a durable repository fronted by an in-memory
/// mirror, plus the notification outbox fed by every activation.
///
/// Writes for one (user, action) are serialized through [`KeyLocks`]; the
/// mirror is only touched after the repository acknowledged the write, so a
/// storage failure never leaves the two out of step.
pub struct TimerStore {
    catalog: CooldownCatalog,
    repo: Arc<dyn TimerRepository>,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
    outbox: NotificationOutbox,
    locks: KeyLocks,
    mirror: RwLock<Mirror>,
}

impl TimerStore {
    pub fn new(
        catalog: CooldownCatalog,
        repo: Arc<dyn TimerRepository>,
        audit: Arc<dyn AuditLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            repo,
            audit,
            clock,
            outbox: NotificationOutbox::new(),
            locks: KeyLocks::new(),
            mirror: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &CooldownCatalog {
        &self.catalog
    }

    pub fn outbox(&self) -> &NotificationOutbox {
        &self.outbox
    }

    pub fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    pub async fn initialize(&self) -> AppResult<()> {
        self.repo.initialize().await
    }

    /// Rehydrate the mirror from storage and queue a notification for every
    /// timer still cooling down. Timers already past expiry count as notified.
    pub async fn load_all(&self, now: Timestamp) -> AppResult<Vec<TimerRecord>> {
        let records = self.repo.load_all().await?;
        let mut queued = 0usize;

        for record in &records {
            let key = record.key();
            let _guard = self.locks.lock(&key).await;

            // a live activation that raced startup wins
            if let Some(current) = self.get(&key)? {
                if current.activated_at >= record.activated_at {
                    continue;
                }
            }
            self.mirror_insert(record.clone())?;

            let fire_at = record.expires_at(&self.catalog);
            if fire_at > now {
                let pending = self
                    .outbox
                    .prepare(record.user_id, &record.action_name, fire_at);
                self.outbox.enqueue(pending)?;
                queued += 1;
            }
        }

        tracing::info!(
            timers = records.len(),
            pending = queued,
            "timer state loaded"
        );
        Ok(records)
    }

    pub fn get(&self, key: &TimerKey) -> AppResult<Option<TimerRecord>> {
        let mirror = self.read()?;
        Ok(mirror
            .get(&key.user_id)
            .and_then(|m| m.get(&key.action_name))
            .cloned())
    }

    pub fn get_activation(&self, user_id: UserId, action_name: &str) -> AppResult<Option<Timestamp>> {
        Ok(self
            .get(&TimerKey::new(user_id, action_name))?
            .map(|r| r.activated_at))
    }

    pub fn remaining(&self, user_id: UserId, action_name: &str, now: Timestamp) -> AppResult<Duration> {
        let key = TimerKey::new(user_id, action_name);
        Ok(match self.get(&key)? {
            Some(r) => remaining(now, Some(r.activated_at), r.cooldown(&self.catalog)),
            None => Duration::ZERO,
        })
    }

    /// Unconditionally (re)start the cooldown window for a catalog action.
    pub async fn activate(&self, user_id: UserId, action_name: &str, now: Timestamp) -> AppResult<TimerRecord> {
        let key = TimerKey::new(user_id, action_name);
        let guard = self.locks.lock(&key).await;
        let record = self.activate_locked(&key, now, None).await?;
        drop(guard);

        self.record(
            AuditEntry::new(AuditKind::ActionUsed, user_id, now)
                .action(action_name)
                .detail("recorded"),
        )
        .await;
        Ok(record)
    }

    /// Check availability and activate as one step under the key lock, so two
    /// racing requests cannot both start the same cooldown.
    pub async fn try_activate(
        &self,
        user_id: UserId,
        action_name: &str,
        now: Timestamp,
    ) -> AppResult<ActivationOutcome> {
        let key = TimerKey::new(user_id, action_name);
        let guard = self.locks.lock(&key).await;

        let left = self.remaining(user_id, action_name, now)?;
        if !left.is_zero() {
            return Ok(ActivationOutcome::StillCooling { remaining: left });
        }

        let record = self.activate_locked(&key, now, None).await?;
        drop(guard);

        self.record(
            AuditEntry::new(AuditKind::ActionUsed, user_id, now)
                .action(action_name)
                .detail("started"),
        )
        .await;
        Ok(ActivationOutcome::Started(record))
    }

    /// Start a user-defined timer. Always restarts, like catalog re-activation.
    pub async fn activate_custom(
        &self,
        user_id: UserId,
        duration: CustomDuration,
        now: Timestamp,
    ) -> AppResult<TimerRecord> {
        let key = TimerKey::new(user_id, duration.action_name());
        let guard = self.locks.lock(&key).await;
        let record = self
            .activate_locked(&key, now, Some(duration.total_secs()))
            .await?;
        drop(guard);

        self.record(
            AuditEntry::new(AuditKind::CustomTimer, user_id, now)
                .action(key.action_name)
                .detail(format!("{}s", duration.total_secs())),
        )
        .await;
        Ok(record)
    }

    async fn activate_locked(
        &self,
        key: &TimerKey,
        now: Timestamp,
        custom_cooldown_secs: Option<u64>,
    ) -> AppResult<TimerRecord> {
        // never move a timer backwards if the wall clock stepped back
        let activated_at = match self.get(key)? {
            Some(prev) => prev.activated_at.max(now),
            None => now,
        };
        let record = TimerRecord {
            user_id: key.user_id,
            action_name: key.action_name.clone(),
            activated_at,
            custom_cooldown_secs,
        };

        self.repo.upsert(&record).await?;
        self.mirror_insert(record.clone())?;

        let pending = self.outbox.prepare(
            key.user_id,
            &key.action_name,
            record.expires_at(&self.catalog),
        );
        let fire_at = pending.fire_at;
        if let Some(old) = self.outbox.enqueue(pending)? {
            tracing::debug!(key = %key, old_fire_at = old.fire_at, "pending notification superseded");
        }
        tracing::debug!(key = %key, activated_at, fire_at, "timer activated");

        Ok(record)
    }

    /// Delete the timer and cancel its pending notification.
    pub async fn deactivate(&self, user_id: UserId, action_name: &str) -> AppResult<bool> {
        let key = TimerKey::new(user_id, action_name);
        let guard = self.locks.lock(&key).await;

        let removed = self.repo.delete(&key).await?;
        let had_mirror = self.mirror_remove(&key)?;
        let cancelled = self.outbox.cancel(user_id, action_name)?.is_some();
        drop(guard);
        self.locks.release(&key);

        let existed = removed || had_mirror;
        if existed {
            self.record(
                AuditEntry::new(AuditKind::TimerDeleted, user_id, self.clock.now())
                    .action(action_name)
                    .detail(if cancelled {
                        "deleted manually, pending notification cancelled"
                    } else {
                        "deleted manually"
                    }),
            )
            .await;
        }
        Ok(existed)
    }

    /// Drop a pending notification without touching the timer itself.
    pub async fn dismiss(&self, user_id: UserId, action_name: &str) -> AppResult<bool> {
        let key = TimerKey::new(user_id, action_name);
        let guard = self.locks.lock(&key).await;
        let cancelled = self.outbox.cancel(user_id, action_name)?.is_some();
        drop(guard);
        self.locks.release(&key);

        self.record(
            AuditEntry::new(AuditKind::NotificationDismissed, user_id, self.clock.now())
                .action(action_name)
                .detail(if cancelled { "pending entry cancelled" } else { "hidden by user" }),
        )
        .await;
        Ok(cancelled)
    }

    /// Timers of `user_id` still cooling at `now`, ordered by action name.
    pub fn list_active(&self, user_id: UserId, now: Timestamp) -> AppResult<Vec<ActiveTimer>> {
        let mirror = self.read()?;
        let Some(timers) = mirror.get(&user_id) else {
            return Ok(vec![]);
        };
        Ok(timers
            .values()
            .filter_map(|r| {
                let left = remaining(now, Some(r.activated_at), r.cooldown(&self.catalog));
                (!left.is_zero()).then(|| ActiveTimer {
                    action_name: r.action_name.clone(),
                    remaining_seconds: left.as_secs(),
                })
            })
            .collect())
    }

    /// Audit is diagnostic only; a failed append is logged, never fatal.
    pub async fn record(&self, entry: AuditEntry) {
        tracing::info!(
            kind = %entry.kind,
            user_id = %entry.user_id,
            action = entry.action_name.as_deref().unwrap_or("N/A"),
            detail = entry.detail.as_deref().unwrap_or(""),
            "audit"
        );
        if let Err(e) = self.audit.append(&entry).await {
            tracing::warn!(error = %e, kind = %entry.kind, "audit append failed");
        }
    }

    pub async fn recent_audit(&self, limit: u32) -> AppResult<Vec<AuditEntry>> {
        self.audit.recent(limit).await
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Mirror>> {
        self.mirror
            .read()
            .map_err(|_| AppError::Storage("lock poisoned".into()))
    }

    fn mirror_insert(&self, record: TimerRecord) -> AppResult<()> {
        let mut mirror = self
            .mirror
            .write()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        mirror
            .entry(record.user_id)
            .or_default()
            .insert(record.action_name.clone(), record);
        Ok(())
    }

    fn mirror_remove(&self, key: &TimerKey) -> AppResult<bool> {
        let mut mirror = self
            .mirror
            .write()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        let Some(timers) = mirror.get_mut(&key.user_id) else {
            return Ok(false);
        };
        let removed = timers.remove(&key.action_name).is_some();
        if timers.is_empty() {
            mirror.remove(&key.user_id);
        }
        Ok(removed)
    }
}
