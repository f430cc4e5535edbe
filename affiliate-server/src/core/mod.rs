//! Core: configuration and background task lifecycle

pub mod config;
pub mod tasks;

pub use config::{Config, MAX_ID_BATCH};
pub use tasks::BackgroundTasks;
