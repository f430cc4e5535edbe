//! Withdrawal settlement engine
//!
//! One pass over every affiliate: collect paid earnings inside the billing
//! window, keep those whose order can no longer be returned, and turn the
//! total into a pending withdrawal when it reaches the configured minimum.

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AffiliateEarning, AffiliateSettings, NotificationPayload, Order, User, Withdrawal,
    WithdrawalStatus,
};
use shared::money::format_currency;
use std::collections::HashMap;
use thiserror::Error;

use super::batch::fetch_by_ids;
use super::eligibility::{self, Eligibility};
use super::store::{SettlementBatch, SettlementStore};
use super::window::{BillingWindow, compute_window};
use crate::db::repository::RepoError;
use crate::notify::Notifier;
use crate::utils::time;

pub const DEFAULT_NOTIFICATION_HREF: &str = "/affiliate";
const NOTIFICATION_ICON: &str = "wallet";
const NOTIFICATION_TITLE: &str = "Withdrawal requested";

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Clock value {0} is out of range")]
    InvalidClock(i64),

    #[error("Failed to load affiliate settings: {0}")]
    Settings(#[source] RepoError),

    #[error("Failed to list affiliates: {0}")]
    ListAffiliates(#[source] RepoError),

    #[error("Failed to load earnings: {0}")]
    Earnings(#[source] RepoError),

    #[error("Failed to load orders: {0}")]
    Orders(#[source] RepoError),

    #[error("Failed to commit settlement: {0}")]
    Commit(#[source] RepoError),
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::InvalidClock(now) => {
                AppError::internal(format!("Clock value {now} is out of range"))
            }
            SettlementError::Commit(RepoError::Conflict(msg)) => {
                AppError::with_message(ErrorCode::SettlementConflict, msg)
            }
            SettlementError::Settings(RepoError::Validation(msg) | RepoError::Corrupt(msg)) => {
                AppError::with_message(ErrorCode::SettingsInvalid, msg)
            }
            SettlementError::Settings(e)
            | SettlementError::ListAffiliates(e)
            | SettlementError::Earnings(e)
            | SettlementError::Orders(e)
            | SettlementError::Commit(e) => e.into(),
        }
    }
}

/// What one pass did for one affiliate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffiliateOutcome {
    /// No payout account on file
    SkippedNoPayout,
    /// No paid earnings inside the window
    NoEarnings,
    /// Paid earnings exist but none has cleared its return window
    NothingEligible { waiting: usize },
    /// Eligible total did not reach the minimum
    BelowMinimum { total: Decimal },
    Settled {
        withdrawal_id: i64,
        amount: Decimal,
        earnings: usize,
    },
}

/// Result of one settlement pass
#[derive(Debug, Clone)]
pub struct SettlementSummary {
    /// Business date the pass ran for
    pub today: NaiveDate,
    /// `None` when today is not a withdrawal day
    pub window: Option<BillingWindow>,
    pub scanned: usize,
    pub settled: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_settled: Decimal,
    pub outcomes: Vec<(String, AffiliateOutcome)>,
}

impl SettlementSummary {
    fn new(today: NaiveDate, window: Option<BillingWindow>) -> Self {
        Self {
            today,
            window,
            scanned: 0,
            settled: 0,
            skipped: 0,
            failed: 0,
            total_settled: Decimal::ZERO,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, affiliate_uid: &str, outcome: AffiliateOutcome) {
        match &outcome {
            AffiliateOutcome::Settled { amount, .. } => {
                self.settled += 1;
                self.total_settled += *amount;
            }
            _ => self.skipped += 1,
        }
        self.outcomes.push((affiliate_uid.to_string(), outcome));
    }

    pub fn outcome_for(&self, affiliate_uid: &str) -> Option<&AffiliateOutcome> {
        self.outcomes
            .iter()
            .find(|(uid, _)| uid == affiliate_uid)
            .map(|(_, outcome)| outcome)
    }
}

/// Notification sent after a withdrawal is committed
pub fn settlement_notification(amount: Decimal, href: &str) -> NotificationPayload {
    NotificationPayload {
        icon: NOTIFICATION_ICON.to_string(),
        title: NOTIFICATION_TITLE.to_string(),
        description: format!(
            "{} from your eligible commissions has been submitted for payout.",
            format_currency(amount)
        ),
        href: href.to_string(),
    }
}

pub struct SettlementEngine<S, N> {
    store: S,
    notifier: N,
    tz: Tz,
    notification_href: String,
}

impl<S: SettlementStore, N: Notifier> SettlementEngine<S, N> {
    pub fn new(store: S, notifier: N, tz: Tz) -> Self {
        Self {
            store,
            notifier,
            tz,
            notification_href: DEFAULT_NOTIFICATION_HREF.to_string(),
        }
    }

    pub fn with_notification_href(mut self, href: impl Into<String>) -> Self {
        self.notification_href = href.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Run one settlement pass at the current instant
    pub async fn process_withdrawals(&self) -> Result<SettlementSummary, SettlementError> {
        self.process_withdrawals_at(shared::util::now_millis()).await
    }

    /// Run one settlement pass as if the clock read `now` (Unix millis)
    ///
    /// Errors returned here happened before any affiliate was touched.
    /// Per-affiliate failures are logged and counted in the summary.
    pub async fn process_withdrawals_at(&self, now: i64) -> Result<SettlementSummary, SettlementError> {
        self.run(now)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Settlement run aborted"))
    }

    async fn run(&self, now: i64) -> Result<SettlementSummary, SettlementError> {
        let today = time::from_millis(now, self.tz)
            .map(|dt| dt.date_naive())
            .ok_or(SettlementError::InvalidClock(now))?;

        let settings = self
            .store
            .load_settings()
            .await
            .map_err(SettlementError::Settings)?;

        let Some(window) = compute_window(&settings, today) else {
            tracing::debug!(
                today = %today,
                day1 = settings.withdrawal_day1,
                day2 = settings.withdrawal_day2,
                "Not a withdrawal day, nothing to settle"
            );
            return Ok(SettlementSummary::new(today, None));
        };

        let affiliates = self
            .store
            .list_affiliates()
            .await
            .map_err(SettlementError::ListAffiliates)?;

        let start = window.start_millis(self.tz);
        let end = window.end_millis(self.tz);
        tracing::info!(
            today = %today,
            window = %window,
            affiliates = affiliates.len(),
            minimum = %settings.minimum_withdrawal,
            "Settlement run started"
        );

        let mut summary = SettlementSummary::new(today, Some(window));
        for affiliate in &affiliates {
            summary.scanned += 1;
            match self.settle_affiliate(affiliate, &settings, start, end, now).await {
                Ok(outcome) => summary.record(&affiliate.uid, outcome),
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(
                        affiliate_uid = %affiliate.uid,
                        error = %e,
                        "Affiliate settlement failed"
                    );
                }
            }
        }

        tracing::info!(
            window = %window,
            scanned = summary.scanned,
            settled = summary.settled,
            skipped = summary.skipped,
            failed = summary.failed,
            total = %summary.total_settled,
            "Settlement run finished"
        );
        Ok(summary)
    }

    async fn settle_affiliate(
        &self,
        affiliate: &User,
        settings: &AffiliateSettings,
        start: i64,
        end: i64,
        now: i64,
    ) -> Result<AffiliateOutcome, SettlementError> {
        let uid = affiliate.uid.as_str();

        let Some(payout_info) = affiliate.settlement_account() else {
            tracing::debug!(affiliate_uid = %uid, "No payout account, skipping");
            return Ok(AffiliateOutcome::SkippedNoPayout);
        };

        let earnings = self
            .store
            .find_paid_earnings(uid, start, end)
            .await
            .map_err(SettlementError::Earnings)?;
        if earnings.is_empty() {
            return Ok(AffiliateOutcome::NoEarnings);
        }

        let orders = self.load_orders(&earnings).await?;
        let (eligible, waiting): (Vec<&AffiliateEarning>, Vec<&AffiliateEarning>) = earnings
            .iter()
            .partition(|earning| {
                let verdict = eligibility::check(orders.get(&earning.order_id), now);
                if let Eligibility::Eligible = verdict {
                    true
                } else {
                    tracing::debug!(
                        affiliate_uid = %uid,
                        earning_id = earning.id,
                        order_id = earning.order_id,
                        reason = ?verdict,
                        "Earning not yet eligible"
                    );
                    false
                }
            });

        if eligible.is_empty() {
            return Ok(AffiliateOutcome::NothingEligible {
                waiting: waiting.len(),
            });
        }

        let total: Decimal = eligible.iter().map(|e| e.commission_amount).sum();
        if total <= Decimal::ZERO || total < settings.minimum_withdrawal {
            tracing::debug!(
                affiliate_uid = %uid,
                total = %total,
                minimum = %settings.minimum_withdrawal,
                "Eligible total below minimum withdrawal"
            );
            return Ok(AffiliateOutcome::BelowMinimum { total });
        }

        let withdrawal = Withdrawal {
            id: shared::util::snowflake_id(),
            affiliate_uid: uid.to_string(),
            amount: total,
            status: WithdrawalStatus::Pending,
            requested_at: now,
            payout_info: payout_info.clone(),
        };
        let withdrawal_id = withdrawal.id;
        let batch = SettlementBatch {
            withdrawal,
            earning_ids: eligible.iter().map(|e| e.id).collect(),
        };

        self.store
            .commit_settlement(&batch)
            .await
            .map_err(SettlementError::Commit)?;
        crate::settlement_log!(uid, withdrawal_id, total, batch.earning_ids.len());

        let payload = settlement_notification(total, &self.notification_href);
        if let Err(e) = self.notifier.notify(uid, &payload).await {
            tracing::warn!(
                affiliate_uid = %uid,
                withdrawal_id = withdrawal_id,
                error = %e,
                "Settlement notification failed"
            );
        }

        Ok(AffiliateOutcome::Settled {
            withdrawal_id,
            amount: total,
            earnings: batch.earning_ids.len(),
        })
    }

    async fn load_orders(
        &self,
        earnings: &[AffiliateEarning],
    ) -> Result<HashMap<i64, Order>, SettlementError> {
        let order_ids: Vec<i64> = earnings.iter().map(|e| e.order_id).collect();
        let store = &self.store;
        let orders = fetch_by_ids(&order_ids, store.id_batch_limit(), |chunk| async move {
            store.fetch_orders(&chunk).await
        })
        .await
        .map_err(SettlementError::Orders)?;

        Ok(orders.into_iter().map(|order| (order.id, order)).collect())
    }
}
