//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Affiliate errors (1xxx)
    Affiliate,
    /// Earning errors (2xxx)
    Earning,
    /// Order errors (3xxx)
    Order,
    /// Withdrawal errors (4xxx)
    Withdrawal,
    /// Settings errors (5xxx)
    Settings,
    /// Notification errors (6xxx)
    Notification,
    /// System errors (7xxx-9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Affiliate,
            2000..3000 => Self::Earning,
            3000..4000 => Self::Order,
            4000..5000 => Self::Withdrawal,
            5000..6000 => Self::Settings,
            6000..7000 => Self::Notification,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Affiliate => "affiliate",
            Self::Earning => "earning",
            Self::Order => "order",
            Self::Withdrawal => "withdrawal",
            Self::Settings => "settings",
            Self::Notification => "notification",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NotAffiliate.category(), ErrorCategory::Affiliate);
        assert_eq!(ErrorCode::InvalidCommissionAmount.category(), ErrorCategory::Earning);
        assert_eq!(ErrorCode::OrderNotFound.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::SettlementConflict.category(), ErrorCategory::Withdrawal);
        assert_eq!(ErrorCode::SettingsInvalid.category(), ErrorCategory::Settings);
        assert_eq!(ErrorCode::NotificationFailed.category(), ErrorCategory::Notification);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_name() {
        assert_eq!(ErrorCategory::Withdrawal.name(), "withdrawal");
        assert_eq!(ErrorCategory::System.name(), "system");
    }
}
