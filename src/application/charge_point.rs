use super::commit::commit;
use super::locks::UserLocks;
use crate::domain::point::{PointMutation, TransactionType, UserPoint, charged_amount};
use crate::domain::ports::{BalanceStoreRef, HistoryStoreRef};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Credits points to a user and records a CHARGE history entry.
pub struct ChargePointService {
    balance_store: BalanceStoreRef,
    history_store: HistoryStoreRef,
    locks: Arc<UserLocks>,
}

impl ChargePointService {
    /// Creates a charger. `locks` must be the registry shared with every other
    /// service that mutates the same balance store.
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

    /// Charges `amount` points and returns the resulting balance.
    ///
    /// A negative amount leaves the balance untouched and returns it unchanged.
    pub async fn charge_user_point(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        Ok(self.try_charge(user_id, amount).await?.into_point())
    }

    /// Same as [`Self::charge_user_point`], but reports whether the charge was applied.
    #[instrument(skip(self))]
    pub async fn try_charge(&self, user_id: i64, amount: i64) -> Result<PointMutation> {
        let _guard = self.locks.acquire(user_id).await;
        let current = self.balance_store.select_by_id(user_id).await?;

        let new_amount = match charged_amount(&current, amount) {
            Ok(new_amount) => new_amount,
            Err(reason) => {
                debug!(?reason, balance = current.amount, "charge rejected");
                return Ok(PointMutation::Rejected { current, reason });
            }
        };

        let charged = commit(
            self.balance_store.as_ref(),
            self.history_store.as_ref(),
            &current,
            new_amount,
            amount,
            TransactionType::Charge,
        )
        .await?;

        info!(balance = charged.amount, "points charged");
        Ok(PointMutation::Applied(charged))
    }
}
