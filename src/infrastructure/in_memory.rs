use crate::domain::point::{PointHistory, TransactionType, UserPoint, now_millis};
use crate::domain::ports::{BalanceStore, HistoryStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for user balances.
///
/// Uses `Arc<RwLock<HashMap<i64, UserPoint>>>` so clones share the same state.
/// Lookups take the read lock and therefore always observe a whole record.
#[derive(Default, Clone)]
pub struct InMemoryBalanceStore {
    points: Arc<RwLock<HashMap<i64, UserPoint>>>,
}

impl InMemoryBalanceStore {
    /// Creates a new, empty in-memory balance store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn select_by_id(&self, user_id: i64) -> Result<UserPoint> {
        let points = self.points.read().await;
        Ok(points
            .get(&user_id)
            .copied()
            .unwrap_or_else(|| UserPoint::empty(user_id)))
    }

    async fn insert_or_update(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        let point = UserPoint::new(user_id, amount, now_millis());
        let mut points = self.points.write().await;
        points.insert(user_id, point);
        Ok(point)
    }
}

#[derive(Default)]
struct HistoryLog {
    entries: Vec<PointHistory>,
    cursor: u64,
}

/// A thread-safe in-memory, append-only history store.
///
/// Entry ids start at 1 and are assigned under the write lock, so id order
/// matches insertion order.
#[derive(Default, Clone)]
pub struct InMemoryHistoryStore {
    log: Arc<RwLock<HistoryLog>>,
}

impl InMemoryHistoryStore {
    /// Creates a new, empty in-memory history store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn insert(
        &self,
        user_id: i64,
        amount: i64,
        kind: TransactionType,
        timestamp_millis: i64,
    ) -> Result<PointHistory> {
        let mut log = self.log.write().await;
        log.cursor += 1;
        let entry = PointHistory {
            id: log.cursor,
            user_id,
            amount,
            kind,
            timestamp_millis,
        };
        log.entries.push(entry.clone());
        Ok(entry)
    }

    async fn select_all_by_user_id(&self, user_id: i64) -> Result<Vec<PointHistory>> {
        let log = self.log.read().await;
        Ok(log
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_balance_store() {
        let store = InMemoryBalanceStore::new();

        let stored = store.insert_or_update(1, 100).await.unwrap();
        assert_eq!(stored.amount, 100);

        let retrieved = store.select_by_id(1).await.unwrap();
        assert_eq!(retrieved, stored);
    }

    #[tokio::test]
    async fn test_in_memory_balance_store_unknown_user() {
        let store = InMemoryBalanceStore::new();
        let point = store.select_by_id(999).await.unwrap();
        assert_eq!(point.user_id, 999);
        assert_eq!(point.amount, 0);
    }

    #[tokio::test]
    async fn test_in_memory_balance_store_overwrites() {
        let store = InMemoryBalanceStore::new();
        store.insert_or_update(1, 100).await.unwrap();
        store.insert_or_update(1, 40).await.unwrap();
        assert_eq!(store.select_by_id(1).await.unwrap().amount, 40);
    }

    #[tokio::test]
    async fn test_in_memory_history_store() {
        let store = InMemoryHistoryStore::new();
        let first = store
            .insert(1, 100, TransactionType::Charge, 10)
            .await
            .unwrap();
        store
            .insert(2, 5, TransactionType::Charge, 11)
            .await
            .unwrap();
        let third = store.insert(1, 30, TransactionType::Use, 12).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(third.id, 3);

        let history = store.select_all_by_user_id(1).await.unwrap();
        assert_eq!(history, vec![first, third]);

        assert!(store.select_all_by_user_id(42).await.unwrap().is_empty());
    }
}
