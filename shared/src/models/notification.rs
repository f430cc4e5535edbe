//! Notification Model

use serde::{Deserialize, Serialize};

/// What the storefront renders in the bell menu / push body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    /// Icon key understood by the storefront (e.g. "wallet")
    pub icon: String,
    pub title: String,
    pub description: String,
    /// In-app link opened on click
    pub href: String,
}

/// Persisted notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub user_uid: String,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub href: String,
    pub is_read: bool,
    pub created_at: i64,
}
