//! Per-event async locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Serializes multi-step operations on one event. Cloning shares the
/// underlying lock table.
#[derive(Debug, Clone, Default)]
pub struct EventLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
}

impl EventLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the event's lock. Released when the guard drops.
    pub async fn acquire(&self, event_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(event_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_event_is_exclusive() {
        let locks = EventLocks::new();
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.acquire(id)).await;
        assert!(waiting.is_err());

        drop(guard);
        let _again = locks.acquire(id).await;
    }

    #[tokio::test]
    async fn different_events_do_not_block() {
        let locks = EventLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }
}
