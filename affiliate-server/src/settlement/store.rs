//! Storage seam of the settlement engine
//!
//! The engine only sees [`SettlementStore`]; [`SqliteSettlementStore`] is
//! the production adapter over the repository layer.

use async_trait::async_trait;
use shared::models::{AffiliateEarning, AffiliateSettings, Order, User, Withdrawal};
use sqlx::SqlitePool;

use crate::core::MAX_ID_BATCH;
use crate::db::repository::{
    RepoError, RepoResult, affiliate_settings, earning, order, user, withdrawal,
};

/// Everything one affiliate's settlement writes, committed atomically
#[derive(Debug, Clone)]
pub struct SettlementBatch {
    pub withdrawal: Withdrawal,
    pub earning_ids: Vec<i64>,
}

#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Stored settings, defaults when absent
    async fn load_settings(&self) -> RepoResult<AffiliateSettings>;

    /// All affiliates, in a stable order
    async fn list_affiliates(&self) -> RepoResult<Vec<User>>;

    /// Paid earnings of one affiliate created in `[start, end)`
    async fn find_paid_earnings(&self, affiliate_uid: &str, start: i64, end: i64)
    -> RepoResult<Vec<AffiliateEarning>>;

    /// Orders for at most [`id_batch_limit`](Self::id_batch_limit) ids
    async fn fetch_orders(&self, ids: &[i64]) -> RepoResult<Vec<Order>>;

    /// Insert the withdrawal and flip every listed earning from paid to
    /// withdrawn, or change nothing at all
    async fn commit_settlement(&self, batch: &SettlementBatch) -> RepoResult<()>;

    /// Largest id list [`fetch_orders`](Self::fetch_orders) accepts
    fn id_batch_limit(&self) -> usize {
        MAX_ID_BATCH
    }
}

#[derive(Clone)]
pub struct SqliteSettlementStore {
    pool: SqlitePool,
    id_batch_limit: usize,
}

impl SqliteSettlementStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            id_batch_limit: MAX_ID_BATCH,
        }
    }

    /// Lower the ids-per-read limit (clamped to `1..=MAX_ID_BATCH`)
    pub fn with_id_batch_limit(mut self, limit: usize) -> Self {
        self.id_batch_limit = limit.clamp(1, MAX_ID_BATCH);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SettlementStore for SqliteSettlementStore {
    async fn load_settings(&self) -> RepoResult<AffiliateSettings> {
        affiliate_settings::get_or_default(&self.pool).await
    }

    async fn list_affiliates(&self) -> RepoResult<Vec<User>> {
        user::list_affiliates(&self.pool).await
    }

    async fn find_paid_earnings(
        &self,
        affiliate_uid: &str,
        start: i64,
        end: i64,
    ) -> RepoResult<Vec<AffiliateEarning>> {
        earning::find_paid_in_range(&self.pool, affiliate_uid, start, end).await
    }

    async fn fetch_orders(&self, ids: &[i64]) -> RepoResult<Vec<Order>> {
        order::find_by_ids(&self.pool, ids).await
    }

    async fn commit_settlement(&self, batch: &SettlementBatch) -> RepoResult<()> {
        let withdrawal_id = batch.withdrawal.id;
        let mut tx = self.pool.begin().await?;

        withdrawal::insert(&mut *tx, &batch.withdrawal).await?;
        let updated = earning::mark_withdrawn(&mut *tx, &batch.earning_ids, withdrawal_id).await?;

        let expected = batch.earning_ids.len() as u64;
        if updated != expected {
            tx.rollback().await?;
            return Err(RepoError::Conflict(format!(
                "withdrawal {withdrawal_id}: {updated} of {expected} earnings still paid"
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    fn id_batch_limit(&self) -> usize {
        self.id_batch_limit
    }
}
