use super::charge_point::ChargePointService;
use super::locks::UserLocks;
use super::read_history::ReadHistoryService;
use super::read_point::ReadPointService;
use super::use_point::UsePointService;
use crate::domain::point::{PointHistory, UserPoint};
use crate::domain::ports::{BalanceStoreRef, HistoryStoreRef};
use crate::error::Result;
use std::sync::Arc;

/// Entry point bundling the four point operations over one pair of stores.
///
/// The charger and the debiter share a single [`UserLocks`] registry, so a charge
/// and a use of the same user are serialized with respect to each other.
pub struct PointLedger {
    reader: ReadPointService,
    charger: ChargePointService,
    debiter: UsePointService,
    history: ReadHistoryService,
}

impl PointLedger {
    /// Creates a new `PointLedger`.
    ///
    /// # Arguments
    ///
    /// * `balance_store` - The store holding current balances.
    /// * `history_store` - The append-only store of charge/use records.
    pub fn new(balance_store: BalanceStoreRef, history_store: HistoryStoreRef) -> Self {
        let locks = Arc::new(UserLocks::new());
        Self {
            reader: ReadPointService::new(Arc::clone(&balance_store)),
            charger: ChargePointService::new(
                Arc::clone(&balance_store),
                Arc::clone(&history_store),
                Arc::clone(&locks),
            ),
            debiter: UsePointService::new(balance_store, Arc::clone(&history_store), locks),
            history: ReadHistoryService::new(history_store),
        }
    }

    pub async fn get_balance(&self, user_id: i64) -> Result<UserPoint> {
        self.reader.get_user_point(user_id).await
    }

    pub async fn charge(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        self.charger.charge_user_point(user_id, amount).await
    }

    /// Debits points. Named `use_points` since `use` is a keyword.
    pub async fn use_points(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        self.debiter.use_user_point(user_id, amount).await
    }

    pub async fn list_history(&self, user_id: i64) -> Result<Vec<PointHistory>> {
        self.history.get_point_history(user_id).await
    }

    pub fn charger(&self) -> &ChargePointService {
        &self.charger
    }

    pub fn debiter(&self) -> &UsePointService {
        &self.debiter
    }
}
