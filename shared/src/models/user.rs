//! User Model (affiliate view of a storefront account)

use serde::{Deserialize, Serialize};

/// Where an affiliate wants commissions paid (e.g. bKash / Nagad / bank)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutInfo {
    pub method: String,
    pub account_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Auth provider uid
    pub uid: String,
    pub display_name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_affiliate: bool,
    pub payout_info: Option<PayoutInfo>,
}

impl User {
    /// Payout account usable for settlement; a blank account number counts
    /// as missing.
    pub fn settlement_account(&self) -> Option<&PayoutInfo> {
        self.payout_info
            .as_ref()
            .filter(|info| !info.account_number.trim().is_empty())
    }
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub uid: String,
    pub display_name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_affiliate: bool,
    pub payout_info: Option<PayoutInfo>,
}
