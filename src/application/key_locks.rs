use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::TimerKey;

/// One async mutex per timer key, so writes to the same (user, action)
/// serialize while unrelated keys proceed in parallel.
#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<TimerKey, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &TimerKey) -> OwnedMutexGuard<()> {
        // clone out of the shard before awaiting
        let m = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        m.lock_owned().await
    }

    /// Drop the mutex for `key` if nobody holds or waits on it.
    pub fn release(&self, key: &TimerKey) {
        self.locks.remove_if(key, |_, m| Arc::strong_count(m) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
