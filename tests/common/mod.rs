#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use farm_timers::application::{
    AppError, AppResult, AuditLog, Clock, ExpiryScheduler, Notifier, TimerRepository, TimerStore,
};
use farm_timers::domain::{CooldownCatalog, ExpiryNotice, TimerKey, TimerRecord};
use farm_timers::infrastructure::clock::ManualClock;
use farm_timers::infrastructure::memory_store::{InMemoryAuditLog, InMemoryTimerRepository};

#[derive(Clone, Default)]
pub struct CountingNotifier {
    sent: Arc<Mutex<Vec<ExpiryNotice>>>,
    fail: Arc<AtomicBool>,
    attempts: Arc<AtomicU32>,
    delay: Option<Duration>,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<ExpiryNotice> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, notice: &ExpiryNotice) -> AppResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Notifier("transport down".into()));
        }
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// Repository whose writes can be switched to fail.
#[derive(Clone, Default)]
pub struct FlakyRepository {
    inner: InMemoryTimerRepository,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimerRepository for FlakyRepository {
    async fn initialize(&self) -> AppResult<()> {
        Ok(())
    }

    async fn load_all(&self) -> AppResult<Vec<TimerRecord>> {
        self.inner.load_all().await
    }

    async fn upsert(&self, record: &TimerRecord) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disk full".into()));
        }
        self.inner.upsert(record).await
    }

    async fn delete(&self, key: &TimerKey) -> AppResult<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disk full".into()));
        }
        self.inner.delete(key).await
    }
}

pub struct Harness {
    pub store: Arc<TimerStore>,
    pub repo: InMemoryTimerRepository,
    pub audit: InMemoryAuditLog,
    pub clock: ManualClock,
    pub notifier: CountingNotifier,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_repo(InMemoryTimerRepository::new())
    }

    pub fn with_repo(repo: InMemoryTimerRepository) -> Self {
        let audit = InMemoryAuditLog::new();
        let repo_dyn: Arc<dyn TimerRepository> = Arc::new(repo.clone());
        let audit_dyn: Arc<dyn AuditLog> = Arc::new(audit.clone());
        let clock = ManualClock::new(0);
        let clock_dyn: Arc<dyn Clock> = Arc::new(clock.clone());
        Self {
            store: Arc::new(TimerStore::new(
                CooldownCatalog::builtin(),
                repo_dyn,
                audit_dyn,
                clock_dyn,
            )),
            repo,
            audit,
            clock,
            notifier: CountingNotifier::new(),
        }
    }

    pub fn scheduler(&self) -> ExpiryScheduler {
        self.scheduler_with(self.notifier.clone())
    }

    pub fn scheduler_with(&self, notifier: CountingNotifier) -> ExpiryScheduler {
        ExpiryScheduler::new(
            self.store.clone(),
            Arc::new(notifier),
            Arc::new(self.clock.clone()),
        )
    }
}
