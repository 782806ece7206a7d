use crate::domain::point::{TransactionType, UserPoint, now_millis};
use crate::domain::ports::{BalanceStore, HistoryStore};
use crate::error::Result;
use tracing::{error, warn};

/// Writes a validated balance change and appends its history entry.
///
/// Must be called while holding the user's lock. When the history append fails
/// the previous amount is written back before the error is returned, so the
/// balance does not drift from its history.
pub(crate) async fn commit(
    balance_store: &dyn BalanceStore,
    history_store: &dyn HistoryStore,
    previous: &UserPoint,
    new_amount: i64,
    amount: i64,
    kind: TransactionType,
) -> Result<UserPoint> {
    let user_id = previous.user_id;
    let updated = balance_store.insert_or_update(user_id, new_amount).await?;

    if let Err(e) = history_store
        .insert(user_id, amount, kind, now_millis())
        .await
    {
        warn!(user_id, error = %e, "history append failed, restoring balance");
        if let Err(restore) = balance_store
            .insert_or_update(user_id, previous.amount)
            .await
        {
            error!(user_id, error = %restore, "failed to restore balance");
        }
        return Err(e);
    }

    Ok(updated)
}
