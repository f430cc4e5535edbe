//! affiliate-server: daily withdrawal settlement
//!
//! `affiliate-server`         run as a daemon, settling at `SETTLEMENT_RUN_AT`
//! `affiliate-server --once`  run a single pass and exit (external cron)

use std::sync::Arc;

use affiliate_server::{
    BackgroundTasks, Config, DbService, SettlementScheduler, build_engine, init_logger_with_file,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    let once = std::env::args().skip(1).any(|arg| arg == "--once");
    tracing::info!(
        environment = %config.environment,
        timezone = %config.timezone,
        once,
        "Affiliate server starting"
    );

    let db = DbService::new(&config.database_path).await?;
    let engine = build_engine(&config, &db)?;

    if once {
        let summary = engine.process_withdrawals().await?;
        tracing::info!(
            today = %summary.today,
            settled = summary.settled,
            failed = summary.failed,
            total = %summary.total_settled,
            "Single settlement pass complete"
        );
        db.pool.close().await;
        return Ok(());
    }

    let mut tasks = BackgroundTasks::new();
    let scheduler = SettlementScheduler::new(Arc::new(engine), config.run_at, tasks.shutdown_token());
    tasks.spawn("settlement_scheduler", scheduler.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    tasks.shutdown().await;
    db.pool.close().await;
    Ok(())
}
