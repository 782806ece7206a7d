use crate::domain::point::UserPoint;
use crate::domain::ports::BalanceStoreRef;
use crate::error::Result;

/// Looks up a user's current balance.
pub struct ReadPointService {
    balance_store: BalanceStoreRef,
}

impl ReadPointService {
    pub fn new(balance_store: BalanceStoreRef) -> Self {
        Self { balance_store }
    }

    /// Returns the stored balance, or a zero balance for a user never seen before.
    pub async fn get_user_point(&self, user_id: i64) -> Result<UserPoint> {
        self.balance_store.select_by_id(user_id).await
    }
}
