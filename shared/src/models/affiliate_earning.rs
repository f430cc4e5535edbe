//! Affiliate Earning Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission lifecycle
///
/// pending → paid (referred order confirmed) → withdrawn (settlement only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum EarningStatus {
    Pending,
    Paid,
    Withdrawn,
}

impl EarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Whether `self → next` is a legal step. Withdrawn is terminal.
    pub fn can_transition_to(&self, next: EarningStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid) | (Self::Paid, Self::Withdrawn)
        )
    }
}

impl std::fmt::Display for EarningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One commission record tied to a single referred order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateEarning {
    pub id: i64,
    pub affiliate_uid: String,
    pub order_id: i64,
    pub order_number: String,
    pub product_name: String,
    pub commission_amount: Decimal,
    pub status: EarningStatus,
    /// Unix millis
    pub created_at: i64,
    /// Set when the earning is consumed by a withdrawal
    pub withdrawal_id: Option<i64>,
}

/// Create earning payload (always starts pending)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningCreate {
    pub affiliate_uid: String,
    pub order_id: i64,
    pub order_number: String,
    pub product_name: String,
    pub commission_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use EarningStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Withdrawn));

        assert!(!Pending.can_transition_to(Withdrawn));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Withdrawn.can_transition_to(Paid));
        assert!(!Withdrawn.can_transition_to(Withdrawn));
    }

    #[test]
    fn test_earning_serializes_camel_case() {
        let earning = AffiliateEarning {
            id: 1,
            affiliate_uid: "aff-1".into(),
            order_id: 10,
            order_number: "PM-0010".into(),
            product_name: "Saree".into(),
            commission_amount: Decimal::new(6000, 2),
            status: EarningStatus::Paid,
            created_at: 0,
            withdrawal_id: None,
        };
        let json = serde_json::to_value(&earning).unwrap();
        assert_eq!(json["affiliateUid"], "aff-1");
        assert_eq!(json["status"], "paid");
        assert!(json["withdrawalId"].is_null());
    }
}
