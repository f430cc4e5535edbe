//! Repository Module
//!
//! Free async functions over `&SqlitePool` (or `&mut SqliteConnection`
//! when the call must join a caller's transaction), one module per table.

pub mod affiliate_settings;
pub mod earning;
pub mod notification;
pub mod order;
pub mod user;
pub mod withdrawal;

use shared::error::{AppError, ErrorCode};
use shared::money::MoneyError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A guarded update matched fewer rows than expected
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored value cannot be decoded into its domain type
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<MoneyError> for RepoError {
    fn from(err: MoneyError) -> Self {
        RepoError::Corrupt(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Conflict(msg) => AppError::with_message(ErrorCode::SettlementConflict, msg),
            RepoError::Database(msg) | RepoError::Corrupt(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
