use super::commit::commit;
use super::locks::UserLocks;
use crate::domain::point::{PointMutation, TransactionType, UserPoint, used_amount};
use crate::domain::ports::{BalanceStoreRef, HistoryStoreRef};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Debits points from a user and records a USE history entry.
pub struct UsePointService {
    balance_store: BalanceStoreRef,
    history_store: HistoryStoreRef,
    locks: Arc<UserLocks>,
}

impl UsePointService {
    pub fn new(
        balance_store: BalanceStoreRef,
        history_store: HistoryStoreRef,
        locks: Arc<UserLocks>,
    ) -> Self {
        Self {
            balance_store,
            history_store,
            locks,
        }
    }

    /// Uses `amount` points and returns the resulting balance.
    ///
    /// Negative amounts and amounts above the current balance leave it untouched.
    pub async fn use_user_point(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        Ok(self.try_use(user_id, amount).await?.into_point())
    }

    #[instrument(skip(self))]
    pub async fn try_use(&self, user_id: i64, amount: i64) -> Result<PointMutation> {
        let _guard = self.locks.acquire(user_id).await;
        let current = self.balance_store.select_by_id(user_id).await?;

        let new_amount = match used_amount(&current, amount) {
            Ok(new_amount) => new_amount,
            Err(reason) => {
                debug!(?reason, balance = current.amount, "use rejected");
                return Ok(PointMutation::Rejected { current, reason });
            }
        };

        let used = commit(
            self.balance_store.as_ref(),
            self.history_store.as_ref(),
            &current,
            new_amount,
            amount,
            TransactionType::Use,
        )
        .await?;

        info!(balance = used.amount, "points used");
        Ok(PointMutation::Applied(used))
    }
}
