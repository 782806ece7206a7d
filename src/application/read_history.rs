use crate::domain::point::PointHistory;
use crate::domain::ports::HistoryStoreRef;
use crate::error::Result;

/// Lists the recorded charges and uses of a user, in store order.
pub struct ReadHistoryService {
    history_store: HistoryStoreRef,
}

impl ReadHistoryService {
    pub fn new(history_store: HistoryStoreRef) -> Self {
        Self { history_store }
    }

    pub async fn get_point_history(&self, user_id: i64) -> Result<Vec<PointHistory>> {
        self.history_store.select_all_by_user_id(user_id).await
    }
}
