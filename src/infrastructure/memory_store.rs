use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::{AppError, AppResult, AuditLog, TimerRepository};
use crate::domain::{AuditEntry, TimerKey, TimerRecord};

/// Non-durable timer repository for tests and `--ephemeral` runs.
#[derive(Clone, Default)]
pub struct InMemoryTimerRepository {
    inner: Arc<Mutex<HashMap<TimerKey, TimerRecord>>>,
}

impl InMemoryTimerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as if it had been written by an earlier process.
    pub fn with_records(records: Vec<TimerRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TimerRepository for InMemoryTimerRepository {
    async fn initialize(&self) -> AppResult<()> {
        Ok(())
    }

    async fn load_all(&self) -> AppResult<Vec<TimerRecord>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        let mut out: Vec<TimerRecord> = inner.values().cloned().collect();
        out.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(out)
    }

    async fn upsert(&self, record: &TimerRecord) -> AppResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        inner.insert(record.key(), record.clone());
        Ok(())
    }

    async fn delete(&self, key: &TimerKey) -> AppResult<bool> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        Ok(inner.remove(key).is_some())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: &AuditEntry) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        entries.push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: u32) -> AppResult<Vec<AuditEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        // newest first (since we push at end)
        Ok(entries.iter().rev().take(limit as usize).cloned().collect())
    }
}
