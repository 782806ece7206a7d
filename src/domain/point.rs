use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as milliseconds since the UNIX epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

/// Current point balance of a single user.
///
/// This is the projection of the user's history: it is created implicitly with a zero
/// amount on first lookup and afterwards only rewritten by charge and use operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoint {
    /// The user owning the balance.
    pub user_id: i64,
    /// Points currently available. Never negative after a successful mutation.
    pub amount: i64,
    /// Time of the last write, in epoch milliseconds.
    pub updated_at_millis: i64,
}

impl UserPoint {
    pub fn new(user_id: i64, amount: i64, updated_at_millis: i64) -> Self {
        Self {
            user_id,
            amount,
            updated_at_millis,
        }
    }

    /// Zero balance stamped with the current time.
    pub fn empty(user_id: i64) -> Self {
        Self::new(user_id, 0, now_millis())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Charge,
    Use,
}

/// Immutable record of one applied charge or use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointHistory {
    /// Identifier assigned by the history store.
    pub id: u64,
    pub user_id: i64,
    /// Magnitude of the change.
    pub amount: i64,
    pub kind: TransactionType,
    pub timestamp_millis: i64,
}

impl PointHistory {
    /// Signed effect of this entry on the balance.
    pub fn delta(&self) -> i64 {
        match self.kind {
            TransactionType::Charge => self.amount,
            TransactionType::Use => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NegativeAmount,
    InsufficientBalance,
    Overflow,
}

/// Outcome of a charge or use attempt.
///
/// Rejections are not errors: callers that only need the observable balance
/// use [`PointMutation::into_point`], which yields the unchanged balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointMutation {
    Applied(UserPoint),
    Rejected {
        current: UserPoint,
        reason: RejectReason,
    },
}

impl PointMutation {
    pub fn into_point(self) -> UserPoint {
        match self {
            PointMutation::Applied(point) => point,
            PointMutation::Rejected { current, .. } => current,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, PointMutation::Applied(_))
    }
}

/// Validates a credit against the current balance and returns the new amount.
pub fn charged_amount(current: &UserPoint, amount: i64) -> Result<i64, RejectReason> {
    if amount < 0 {
        return Err(RejectReason::NegativeAmount);
    }
    current
        .amount
        .checked_add(amount)
        .ok_or(RejectReason::Overflow)
}

/// Validates a debit against the current balance and returns the new amount.
pub fn used_amount(current: &UserPoint, amount: i64) -> Result<i64, RejectReason> {
    if amount < 0 {
        return Err(RejectReason::NegativeAmount);
    }
    if current.amount < amount {
        return Err(RejectReason::InsufficientBalance);
    }
    Ok(current.amount - amount)
}
