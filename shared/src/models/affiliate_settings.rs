//! Affiliate Settings Model (singleton document, id = "affiliate")

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// Document id of the settings singleton
pub const AFFILIATE_SETTINGS_ID: &str = "affiliate";

/// Settlement calendar and threshold
///
/// A withdrawal day of 0 disables that half-month settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AffiliateSettings {
    /// Day of month that settles the 1st–15th window
    pub withdrawal_day1: u32,
    /// Day of month that settles the previous 16th–month-end window
    pub withdrawal_day2: u32,
    pub minimum_withdrawal: Decimal,
}

impl Default for AffiliateSettings {
    fn default() -> Self {
        Self {
            withdrawal_day1: 16,
            withdrawal_day2: 1,
            minimum_withdrawal: Decimal::from(100),
        }
    }
}

impl AffiliateSettings {
    pub fn validate(&self) -> AppResult<()> {
        for (field, day) in [
            ("withdrawalDay1", self.withdrawal_day1),
            ("withdrawalDay2", self.withdrawal_day2),
        ] {
            if day > 31 {
                return Err(AppError::with_message(
                    ErrorCode::SettingsInvalid,
                    format!("{field} must be 0 (disabled) or 1-31, got {day}"),
                )
                .with_detail("field", field));
            }
        }
        if self.minimum_withdrawal.is_sign_negative() {
            return Err(AppError::with_message(
                ErrorCode::SettingsInvalid,
                format!(
                    "minimumWithdrawal must be non-negative, got {}",
                    self.minimum_withdrawal
                ),
            )
            .with_detail("field", "minimumWithdrawal"));
        }
        Ok(())
    }
}
