use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::utils::time::{parse_run_at, parse_timezone};
use crate::utils::{AppError, AppResult};

/// Largest id list a single `IN (...)` read may carry
pub const MAX_ID_BATCH: usize = 30;

/// Settlement service configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development / staging / production |
/// | DATABASE_PATH | /var/lib/pabnamart/affiliate.db | SQLite file |
/// | BUSINESS_TIMEZONE | Asia/Dhaka | Zone that decides "today" |
/// | SETTLEMENT_RUN_AT | 00:05 | Daily trigger time (HH:MM, business zone) |
/// | ID_BATCH_LIMIT | 30 | Ids per chunked order read (max 30) |
/// | PUSH_WEBHOOK_URL | - | Push gateway; unset disables push |
/// | PUSH_API_KEY | - | Bearer token for the push gateway |
/// | NOTIFICATION_HREF | /affiliate | Link attached to settlement notifications |
/// | LOG_LEVEL | info | Overridden by RUST_LOG |
/// | LOG_JSON | false in development | JSON log lines |
/// | LOG_DIR | - | Enables rotating file logs |
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub database_path: String,
    pub timezone: Tz,
    pub run_at: NaiveTime,
    pub id_batch_limit: usize,
    pub push_webhook_url: Option<String>,
    pub push_api_key: Option<String>,
    pub notification_href: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// An unparseable time zone is a configuration error; everything else
    /// falls back to its default.
    pub fn from_env() -> AppResult<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let tz_name = std::env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "Asia/Dhaka".into());
        let timezone = parse_timezone(&tz_name).map_err(AppError::config)?;

        let run_at = parse_run_at(
            &std::env::var("SETTLEMENT_RUN_AT").unwrap_or_else(|_| "00:05".into()),
        );

        let id_batch_limit = std::env::var("ID_BATCH_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_ID_BATCH)
            .clamp(1, MAX_ID_BATCH);

        let is_development = environment == "development";

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "/var/lib/pabnamart/affiliate.db".into()),
            timezone,
            run_at,
            id_batch_limit,
            push_webhook_url: std::env::var("PUSH_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            push_api_key: std::env::var("PUSH_API_KEY").ok().filter(|s| !s.is_empty()),
            notification_href: std::env::var("NOTIFICATION_HREF")
                .unwrap_or_else(|_| "/affiliate".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(!is_development),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
