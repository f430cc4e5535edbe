//! Order Model (storefront order, read-only to the settlement engine)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::DAY_MILLIS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Forward-only fulfilment flow; delivered and cancelled are terminal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Delivered)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
    /// Return window in days after delivery (0 = no returns)
    #[serde(default)]
    pub return_policy: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_uid: String,
    pub status: OrderStatus,
    pub total: Decimal,
    /// Unix millis, set when the order reaches `delivered`
    pub delivered_at: Option<i64>,
    pub created_at: i64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Longest return policy across items; negative policies and an empty
    /// item list both count as 0.
    pub fn max_return_days(&self) -> i64 {
        self.items
            .iter()
            .map(|item| i64::from(item.return_policy))
            .fold(0, i64::max)
    }

    /// End of the return window (Unix millis)
    ///
    /// `None` until delivered, or when the end does not fit in an `i64`.
    pub fn return_window_ends_at(&self) -> Option<i64> {
        let delivered = self.delivered_at?;
        self.max_return_days()
            .checked_mul(DAY_MILLIS)
            .and_then(|window| delivered.checked_add(window))
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub order_number: String,
    pub customer_uid: String,
    pub items: Vec<OrderItem>,
}

impl OrderCreate {
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }
}
