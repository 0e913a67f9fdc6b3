/**
 * Per-Workspace Locks
 *
 * Serializes the mutating operations on one workspace (join, join-code
 * rotation, rename, removal) within this process. Each workspace gets its
 * own `tokio::sync::Mutex`, created on first use. Locks nobody holds or
 * waits on are dropped by `cleanup_idle`, which the server runs
 * periodically.
 *
 * Cross-process safety for `join` comes from the unique index on
 * `members (workspace_id, user_id)`, not from these locks.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

type LockMap = HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>;

#[derive(Clone, Default)]
pub struct WorkspaceLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl WorkspaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a workspace. Released on drop.
    pub async fn acquire(&self, workspace_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(workspace_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop locks that are neither held nor awaited. Returns how many went.
    pub fn cleanup_idle(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Number of tracked workspaces
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_workspace_is_exclusive() {
        let locks = WorkspaceLocks::new();
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(id)).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(50), locks.acquire(id)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_different_workspaces_do_not_block() {
        let locks = WorkspaceLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_held_locks() {
        let locks = WorkspaceLocks::new();
        let held = locks.acquire(Uuid::new_v4()).await;
        drop(locks.acquire(Uuid::new_v4()).await);

        assert_eq!(locks.cleanup_idle(), 1);
        assert_eq!(locks.len(), 1);

        drop(held);
        assert_eq!(locks.cleanup_idle(), 1);
        assert!(locks.is_empty());
    }
}
