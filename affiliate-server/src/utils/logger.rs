//! Logging Infrastructure
//!
//! Structured logging setup for development and production.
//! Features:
//! - Daily rotating application logs (deleted after 14 days)
//! - Permanent settlement ledger logs (target = "settlement", never deleted)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing target routed to the permanent settlement ledger
pub const SETTLEMENT_TARGET: &str = "settlement";

/// Days application logs are kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Clean up old application log files (older than 14 days)
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // Rolling appender names files app.YYYY-MM-DD
        if let Some(date_part) = name.strip_prefix("app.")
            && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

/// Initialize the logging system with optional daily rotating files
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug"); `RUST_LOG` overrides it
/// * `json_format` - JSON lines (production) or human-readable (development)
/// * `log_dir` - Optional directory for file logging
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let (app_layer, ledger_layer) = match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            let app_log_dir = log_dir.join("app");
            let ledger_log_dir = log_dir.join(SETTLEMENT_TARGET);
            fs::create_dir_all(&app_log_dir)?;
            fs::create_dir_all(&ledger_log_dir)?;

            // Application logs (rotated daily, subject to cleanup)
            let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
            let app_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != SETTLEMENT_TARGET
                }));

            // Settlement ledger (never deleted)
            let ledger_log =
                RollingFileAppender::new(Rotation::DAILY, ledger_log_dir, SETTLEMENT_TARGET);
            let ledger_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(ledger_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == SETTLEMENT_TARGET
                }));

            tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));

            (Some(app_layer), Some(ledger_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(ledger_layer)
        .try_init()?;

    Ok(())
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Settlement ledger helper - records every committed withdrawal
///
/// Ledger lines go to `settlement/settlement.YYYY-MM-DD` and are never
/// deleted.
///
/// ```ignore
/// settlement_log!("aff-1", withdrawal_id, "110", 2);
/// ```
#[macro_export]
macro_rules! settlement_log {
    ($affiliate_uid:expr, $withdrawal_id:expr, $amount:expr, $earnings:expr) => {
        tracing::info!(
            target: "settlement",
            affiliate_uid = %$affiliate_uid,
            withdrawal_id = $withdrawal_id,
            amount = %$amount,
            earnings = $earnings,
            "SETTLED"
        );
    };
}
