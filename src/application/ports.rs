use async_trait::async_trait;

use crate::domain::{AuditEntry, ExpiryNotice, TimerKey, TimerRecord, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("notifier error: {0}")]
    Notifier(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Durable side of the timer store. A returned `Ok` means the write is on disk.
#[async_trait]
pub trait TimerRepository: Send + Sync {
    /// Create the schema if it does not exist yet.
    async fn initialize(&self) -> AppResult<()>;
    async fn load_all(&self) -> AppResult<Vec<TimerRecord>>;
    async fn upsert(&self, record: &TimerRecord) -> AppResult<()>;
    /// Returns whether a row was removed.
    async fn delete(&self, key: &TimerKey) -> AppResult<bool>;
}

/// Append-only diagnostic log.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> AppResult<()>;
    /// Newest first.
    async fn recent(&self, limit: u32) -> AppResult<Vec<AuditEntry>>;
}

/// Deliver expiry notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &ExpiryNotice) -> AppResult<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
