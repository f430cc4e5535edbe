//! Utility module - logging, time helpers and re-exported error types

pub mod logger;
pub mod time;

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
