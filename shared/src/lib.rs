//! Shared types for PabnaMart affiliate services
//!
//! Common types used across crates: the error system, persisted
//! document models, money formatting and id/time utilities.

pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
