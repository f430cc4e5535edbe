//! PabnaMart affiliate server
//!
//! Background service that settles affiliate commissions into withdrawals.
//!
//! # Module layout
//!
//! ```text
//! affiliate-server/src/
//! ├── core/          # Configuration, background tasks
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── commission/    # Referral earnings and order lifecycle
//! ├── settlement/    # Billing window, eligibility, engine, scheduler
//! ├── notify/        # Inbox notifications and push gateway
//! └── utils/         # Logging, time helpers
//! ```

pub mod commission;
pub mod core;
pub mod db;
pub mod notify;
pub mod settlement;
pub mod utils;

pub use crate::core::{BackgroundTasks, Config};
pub use db::DbService;
pub use notify::{NotificationDispatcher, Notifier, PushClient};
pub use settlement::{SettlementEngine, SettlementScheduler, SettlementSummary, SqliteSettlementStore};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Engine wired to the SQLite store and the notification dispatcher
pub type AffiliateEngine = SettlementEngine<SqliteSettlementStore, NotificationDispatcher>;

/// Build the production engine from configuration
pub fn build_engine(config: &Config, db: &DbService) -> AppResult<AffiliateEngine> {
    let store = SqliteSettlementStore::new(db.pool.clone()).with_id_batch_limit(config.id_batch_limit);

    let mut dispatcher = NotificationDispatcher::new(db.pool.clone());
    match &config.push_webhook_url {
        Some(url) => {
            let push = PushClient::new(url.clone(), config.push_api_key.clone())?;
            dispatcher = dispatcher.with_push(push);
            tracing::info!(url = %url, "Push notifications enabled");
        }
        None if config.is_production() => {
            tracing::warn!("PUSH_WEBHOOK_URL not set in production, notifications stay in-app")
        }
        None => tracing::info!("PUSH_WEBHOOK_URL not set, notifications stay in-app"),
    }

    Ok(SettlementEngine::new(store, dispatcher, config.timezone)
        .with_notification_href(config.notification_href.clone()))
}
