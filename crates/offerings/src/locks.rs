//! Per-offering serialisation of update and delete flows.
//!
//! Reconciliation reads the current schedule and roster and then writes the
//! difference; two flows on the same offering must not interleave. The
//! PostgreSQL store additionally row-locks the offering inside its
//! transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use registrar_core::types::DbId;
use tokio::sync::OwnedMutexGuard;

type Slots = Arc<Mutex<HashMap<DbId, Arc<tokio::sync::Mutex<()>>>>>;

/// Keyed async mutex over offering ids.
#[derive(Clone, Default)]
pub struct OfferingLocks {
    slots: Slots,
}

impl OfferingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `offering_id`.
    ///
    /// The lock is held until the returned guard is dropped.
    pub async fn acquire(&self, offering_id: DbId) -> OfferingLockGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(offering_id).or_default().clone()
        };
        let held = slot.lock_owned().await;
        OfferingLockGuard {
            offering_id,
            held: Some(held),
            slots: self.slots.clone(),
        }
    }

    /// Number of offerings currently locked or awaited.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive access to one offering. Releases on drop.
pub struct OfferingLockGuard {
    offering_id: DbId,
    held: Option<OwnedMutexGuard<()>>,
    slots: Slots,
}

impl OfferingLockGuard {
    pub fn offering_id(&self) -> DbId {
        self.offering_id
    }
}

impl Drop for OfferingLockGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.held = None;
        // Only the map still references the mutex: nobody is waiting.
        let idle = slots
            .get(&self.offering_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1);
        if idle {
            slots.remove(&self.offering_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_offering_is_serialised() {
        let locks = OfferingLocks::new();
        let first = locks.acquire(1).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(1).await.offering_id() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(first);
        assert_eq!(contender.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn different_offerings_do_not_block() {
        let locks = OfferingLocks::new();
        let _a = locks.acquire(1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let locks = OfferingLocks::new();
        {
            let _guard = locks.acquire(7).await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
