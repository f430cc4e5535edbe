//! Withdrawal Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::PayoutInfo;

/// Settlement creates withdrawals as `pending`; payout staff move them on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

/// A payable request produced by settling an affiliate's eligible earnings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: i64,
    pub affiliate_uid: String,
    /// Exact sum of the consumed earnings
    pub amount: Decimal,
    pub status: WithdrawalStatus,
    /// Unix millis
    pub requested_at: i64,
    pub payout_info: PayoutInfo,
}
