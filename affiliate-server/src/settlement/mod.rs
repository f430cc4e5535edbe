//! Withdrawal settlement
//!
//! - [`window`]: which half-month is settled on a given date
//! - [`eligibility`]: whether an earning's order has cleared its return window
//! - [`batch`]: chunked id lookups
//! - [`store`]: storage seam and its SQLite adapter
//! - [`engine`]: the settlement pass
//! - [`scheduler`]: daily trigger

pub mod batch;
pub mod eligibility;
pub mod engine;
pub mod scheduler;
pub mod store;
pub mod window;

pub use engine::{AffiliateOutcome, SettlementEngine, SettlementError, SettlementSummary};
pub use scheduler::SettlementScheduler;
pub use store::{SettlementBatch, SettlementStore, SqliteSettlementStore};
pub use window::{BillingWindow, WindowHalf, compute_window};
