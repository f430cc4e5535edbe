//! Unified error codes for PabnaMart affiliate services
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Affiliate errors
//! - 2xxx: Earning errors
//! - 3xxx: Order errors
//! - 4xxx: Withdrawal errors
//! - 5xxx: Settings errors
//! - 6xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Affiliate ====================
    /// User not found
    UserNotFound = 1001,
    /// User is not an approved affiliate
    NotAffiliate = 1002,

    // ==================== 2xxx: Earning ====================
    /// Commission must be strictly positive
    InvalidCommissionAmount = 2002,

    // ==================== 3xxx: Order ====================
    OrderNotFound = 3001,
    /// Order status change not allowed
    InvalidOrderTransition = 3002,

    // ==================== 4xxx: Withdrawal ====================
    /// Earnings changed while a settlement was being committed
    SettlementConflict = 4003,

    // ==================== 5xxx: Settings ====================
    /// Affiliate settings are out of range
    SettingsInvalid = 5001,

    // ==================== 6xxx: Notification ====================
    NotificationFailed = 6001,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    ConfigError = 9005,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Affiliate
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::NotAffiliate => "User is not an approved affiliate",

            // Earning
            ErrorCode::InvalidCommissionAmount => "Commission amount must be positive",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidOrderTransition => "Order status change is not allowed",

            // Withdrawal
            ErrorCode::SettlementConflict => "Earnings changed during settlement",

            // Settings
            ErrorCode::SettingsInvalid => "Affiliate settings are invalid",

            // Notification
            ErrorCode::NotificationFailed => "Notification dispatch failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Affiliate
            1001 => Ok(ErrorCode::UserNotFound),
            1002 => Ok(ErrorCode::NotAffiliate),

            // Earning
            2002 => Ok(ErrorCode::InvalidCommissionAmount),

            // Order
            3001 => Ok(ErrorCode::OrderNotFound),
            3002 => Ok(ErrorCode::InvalidOrderTransition),

            // Withdrawal
            4003 => Ok(ErrorCode::SettlementConflict),

            // Settings
            5001 => Ok(ErrorCode::SettingsInvalid),

            // Notification
            6001 => Ok(ErrorCode::NotificationFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAffiliate.code(), 1002);
        assert_eq!(ErrorCode::InvalidCommissionAmount.code(), 2002);
        assert_eq!(ErrorCode::OrderNotFound.code(), 3001);
        assert_eq!(ErrorCode::SettlementConflict.code(), 4003);
        assert_eq!(ErrorCode::SettingsInvalid.code(), 5001);
        assert_eq!(ErrorCode::NotificationFailed.code(), 6001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_round_trips_known_codes() {
        for code in [
            ErrorCode::ValueOutOfRange,
            ErrorCode::InvalidCommissionAmount,
            ErrorCode::SettlementConflict,
            ErrorCode::ConfigError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_serde_uses_numeric_code() {
        let json = serde_json::to_string(&ErrorCode::InvalidCommissionAmount).unwrap();
        assert_eq!(json, "2002");
        let code: ErrorCode = serde_json::from_str("3002").unwrap();
        assert_eq!(code, ErrorCode::InvalidOrderTransition);
        assert!(serde_json::from_str::<ErrorCode>("12").is_err());
    }
}
