//! Daily settlement scheduler
//!
//! Runs a catch-up pass on startup when today's trigger time has already
//! passed, then sleeps until the next trigger in the business time zone.
//! Passes are idempotent, so a catch-up on a day that already ran only
//! finds nothing left to settle.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::engine::{SettlementEngine, SettlementSummary};
use super::store::SettlementStore;
use crate::notify::Notifier;
use crate::utils::time;

pub struct SettlementScheduler<S, N> {
    engine: Arc<SettlementEngine<S, N>>,
    run_at: NaiveTime,
    shutdown: CancellationToken,
}

impl<S, N> SettlementScheduler<S, N>
where
    S: SettlementStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        engine: Arc<SettlementEngine<S, N>>,
        run_at: NaiveTime,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            engine,
            run_at,
            shutdown,
        }
    }

    /// Main loop: startup catch-up, then one pass per day
    pub async fn run(self) {
        let tz = self.engine.timezone();
        tracing::info!(run_at = %self.run_at, timezone = %tz, "Settlement scheduler started");

        if Self::missed_today(self.run_at, time::now_in(tz)) {
            tracing::info!("Trigger time already passed today, running catch-up pass");
            self.run_once().await;
        }

        self.periodic_loop(tz).await;

        tracing::info!("Settlement scheduler stopped");
    }

    async fn periodic_loop(&self, tz: Tz) {
        loop {
            let sleep_duration = Self::duration_until_next_run(self.run_at, time::now_in(tz));
            tracing::info!(
                "Next settlement run in {} minutes",
                sleep_duration.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Settlement scheduler received shutdown signal");
                    return;
                }
            }

            self.run_once().await;
        }
    }

    /// One settlement pass; a failed pass leaves the loop running
    async fn run_once(&self) -> Option<SettlementSummary> {
        match self.engine.process_withdrawals().await {
            Ok(summary) => {
                if summary.window.is_none() {
                    tracing::debug!(today = %summary.today, "No settlement window today");
                }
                Some(summary)
            }
            Err(e) => {
                // Retried at the next trigger
                tracing::warn!(error = %e, "Settlement pass failed, waiting for next trigger");
                None
            }
        }
    }

    /// Whether today's trigger instant lies in the past
    fn missed_today(run_at: NaiveTime, now: DateTime<Tz>) -> bool {
        now.time() >= run_at
    }

    /// Time from `now` until the next `run_at` on the business clock
    ///
    /// A trigger time that does not exist on a given day (DST gap) moves to
    /// the following day.
    pub fn duration_until_next_run(run_at: NaiveTime, now: DateTime<Tz>) -> Duration {
        let tz = now.timezone();
        let mut date = now.date_naive();
        if now.time() >= run_at {
            date += ChronoDuration::days(1);
        }

        for _ in 0..3 {
            if let Some(next) = date.and_time(run_at).and_local_timezone(tz).earliest() {
                let millis = (next - now).num_milliseconds().max(0) as u64;
                return Duration::from_millis(millis);
            }
            date += ChronoDuration::days(1);
        }
        Duration::from_secs(24 * 60 * 60)
    }
}
