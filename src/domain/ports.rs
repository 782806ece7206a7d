use super::point::{PointHistory, TransactionType, UserPoint};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Current-state store: one balance record per user.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Returns the user's balance, or a zero balance if none was ever written.
    async fn select_by_id(&self, user_id: i64) -> Result<UserPoint>;
    /// Overwrites the user's balance and returns the stored record.
    async fn insert_or_update(&self, user_id: i64, amount: i64) -> Result<UserPoint>;
}

/// Append-only log of applied mutations.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert(
        &self,
        user_id: i64,
        amount: i64,
        kind: TransactionType,
        timestamp_millis: i64,
    ) -> Result<PointHistory>;
    async fn select_all_by_user_id(&self, user_id: i64) -> Result<Vec<PointHistory>>;
}

pub type BalanceStoreRef = Arc<dyn BalanceStore>;
pub type HistoryStoreRef = Arc<dyn HistoryStore>;
