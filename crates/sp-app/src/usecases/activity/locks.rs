use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use sp_core::ids::SpaceId;

/// One async mutex per space.
///
/// Serializes the read-binding → build-plan → write-record sequence of
/// activate/deactivate within a space; different spaces never contend.
/// Entries nobody holds or waits on are dropped on the next `lock` call.
#[derive(Default)]
pub struct SpaceLocks {
    locks: Mutex<HashMap<SpaceId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SpaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, space_id: &SpaceId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Guards and pending waiters each own a clone.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(space_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_space_waits_other_space_does_not() {
        let locks = Arc::new(SpaceLocks::new());
        let guard = locks.lock(&SpaceId::from("a")).await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock(&SpaceId::from("b"))).await;
        assert!(other.is_ok());

        let same = tokio::time::timeout(Duration::from_millis(50), locks.lock(&SpaceId::from("a"))).await;
        assert!(same.is_err());

        drop(guard);
        let same = tokio::time::timeout(Duration::from_millis(50), locks.lock(&SpaceId::from("a"))).await;
        assert!(same.is_ok());
    }

    #[tokio::test]
    async fn released_spaces_are_forgotten() {
        let locks = SpaceLocks::new();

        drop(locks.lock(&SpaceId::from("a")).await);
        let held = locks.lock(&SpaceId::from("b")).await;
        assert_eq!(locks.tracked(), 1);

        let _other = locks.lock(&SpaceId::from("c")).await;
        assert_eq!(locks.tracked(), 2);

        drop(held);
        drop(locks.lock(&SpaceId::from("a")).await);
        assert_eq!(locks.tracked(), 2);
    }
}
