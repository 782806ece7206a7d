use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-user mutation locks.
///
/// Charge and use are read-modify-write sequences against a shared balance record.
/// Every mutation for a user runs while holding that user's guard, so two
/// concurrent mutations of the same balance can no longer lose an update, while
/// mutations of different users never contend.
///
/// An entry only lives while some task holds or waits for it: releasing the last
/// guard evicts the user from the registry.
#[derive(Default)]
pub struct UserLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

/// Exclusive access to one user's balance. Released on drop.
pub struct UserGuard<'a> {
    user_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<i64, Arc<Mutex<()>>>,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Clones are only taken under the shard lock, so a count of one means
        // nobody holds or waits for this user.
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user_id`'s balance.
    pub async fn acquire(&self, user_id: i64) -> UserGuard<'_> {
        let lock = self.locks.entry(user_id).or_default().clone();
        UserGuard {
            user_id,
            guard: Some(lock.lock_owned().await),
            locks: &self.locks,
        }
    }

    /// Number of users currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
