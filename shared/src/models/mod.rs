//! Data models
//!
//! Documents read and written by the affiliate services. Field names
//! serialize in camelCase to match the storefront documents.
//! Timestamps are `i64` Unix millis, money is `rust_decimal::Decimal`.

pub mod affiliate_earning;
pub mod affiliate_settings;
pub mod notification;
pub mod order;
pub mod user;
pub mod withdrawal;

// Re-exports
pub use affiliate_earning::*;
pub use affiliate_settings::*;
pub use notification::*;
pub use order::*;
pub use user::*;
pub use withdrawal::*;
