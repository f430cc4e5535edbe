//! Affiliate Earning Repository

use super::{RepoError, RepoResult};
use crate::core::MAX_ID_BATCH;
use rust_decimal::Decimal;
use shared::models::{AffiliateEarning, EarningCreate, EarningStatus};
use shared::money::{parse_amount, to_storage};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const EARNING_COLUMNS: &str = "id, affiliate_uid, order_id, order_number, product_name, \
     commission_amount, status, created_at, withdrawal_id";

#[derive(Debug, sqlx::FromRow)]
struct EarningRow {
    id: i64,
    affiliate_uid: String,
    order_id: i64,
    order_number: String,
    product_name: String,
    commission_amount: String,
    status: EarningStatus,
    created_at: i64,
    withdrawal_id: Option<i64>,
}

impl TryFrom<EarningRow> for AffiliateEarning {
    type Error = RepoError;

    fn try_from(row: EarningRow) -> Result<Self, Self::Error> {
        Ok(AffiliateEarning {
            id: row.id,
            affiliate_uid: row.affiliate_uid,
            order_id: row.order_id,
            order_number: row.order_number,
            product_name: row.product_name,
            commission_amount: parse_amount(&row.commission_amount)?,
            status: row.status,
            created_at: row.created_at,
            withdrawal_id: row.withdrawal_id,
        })
    }
}

fn collect(rows: Vec<EarningRow>) -> RepoResult<Vec<AffiliateEarning>> {
    rows.into_iter().map(AffiliateEarning::try_from).collect()
}

pub async fn create(pool: &SqlitePool, data: EarningCreate) -> RepoResult<AffiliateEarning> {
    create_at(pool, data, shared::util::now_millis()).await
}

/// Record a pending earning with an explicit creation time
pub async fn create_at(
    pool: &SqlitePool,
    data: EarningCreate,
    created_at: i64,
) -> RepoResult<AffiliateEarning> {
    if data.commission_amount <= Decimal::ZERO {
        return Err(RepoError::Validation(format!(
            "commission must be positive: {}",
            data.commission_amount
        )));
    }
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO affiliate_earnings \
         (id, affiliate_uid, order_id, order_number, product_name, commission_amount, status, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(&data.affiliate_uid)
    .bind(data.order_id)
    .bind(&data.order_number)
    .bind(&data.product_name)
    .bind(to_storage(data.commission_amount))
    .bind(EarningStatus::Pending)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(AffiliateEarning {
        id,
        affiliate_uid: data.affiliate_uid,
        order_id: data.order_id,
        order_number: data.order_number,
        product_name: data.product_name,
        commission_amount: data.commission_amount,
        status: EarningStatus::Pending,
        created_at,
        withdrawal_id: None,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AffiliateEarning>> {
    let sql = format!("SELECT {EARNING_COLUMNS} FROM affiliate_earnings WHERE id = ?");
    let row = sqlx::query_as::<_, EarningRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(AffiliateEarning::try_from).transpose()
}

/// Paid earnings of one affiliate created in `[start, end)`
pub async fn find_paid_in_range(
    pool: &SqlitePool,
    affiliate_uid: &str,
    start: i64,
    end: i64,
) -> RepoResult<Vec<AffiliateEarning>> {
    let sql = format!(
        "SELECT {EARNING_COLUMNS} FROM affiliate_earnings \
         WHERE affiliate_uid = ?1 AND status = ?2 AND created_at >= ?3 AND created_at < ?4 \
         ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, EarningRow>(&sql)
        .bind(affiliate_uid)
        .bind(EarningStatus::Paid)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
    collect(rows)
}

pub async fn find_by_withdrawal(
    pool: &SqlitePool,
    withdrawal_id: i64,
) -> RepoResult<Vec<AffiliateEarning>> {
    let sql = format!(
        "SELECT {EARNING_COLUMNS} FROM affiliate_earnings WHERE withdrawal_id = ? ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, EarningRow>(&sql)
        .bind(withdrawal_id)
        .fetch_all(pool)
        .await?;
    collect(rows)
}

/// Move every earning of an order from `from` to `to`, returns rows changed
pub async fn transition_for_order(
    pool: &SqlitePool,
    order_id: i64,
    from: EarningStatus,
    to: EarningStatus,
) -> RepoResult<u64> {
    if !from.can_transition_to(to) {
        return Err(RepoError::Validation(format!(
            "earning cannot move from {from} to {to}"
        )));
    }
    let rows = sqlx::query("UPDATE affiliate_earnings SET status = ?1 WHERE order_id = ?2 AND status = ?3")
        .bind(to)
        .bind(order_id)
        .bind(from)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

/// Mark paid earnings withdrawn and link them to a withdrawal
///
/// Runs on the caller's connection so it joins the settlement
/// transaction. Only rows still `paid` are touched; the returned count
/// lets the caller detect earnings that changed underneath it.
pub async fn mark_withdrawn(
    conn: &mut SqliteConnection,
    earning_ids: &[i64],
    withdrawal_id: i64,
) -> RepoResult<u64> {
    let mut updated = 0;
    for chunk in earning_ids.chunks(MAX_ID_BATCH) {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE affiliate_earnings SET status = ");
        qb.push_bind(EarningStatus::Withdrawn);
        qb.push(", withdrawal_id = ");
        qb.push_bind(withdrawal_id);
        qb.push(" WHERE status = ");
        qb.push_bind(EarningStatus::Paid);
        qb.push(" AND id IN (");
        let mut sep = qb.separated(", ");
        for id in chunk {
            sep.push_bind(*id);
        }
        sep.push_unseparated(")");
        updated += qb.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use crate::db::repository::{order, user};
    use shared::models::{OrderCreate, OrderItem, UserCreate};

    async fn seed(pool: &SqlitePool) -> i64 {
        user::create(
            pool,
            UserCreate {
                uid: "aff-1".into(),
                display_name: "Karim".into(),
                email: None,
                is_affiliate: true,
                payout_info: None,
            },
        )
        .await
        .unwrap();
        order::create(
            pool,
            OrderCreate {
                order_number: "PM-1".into(),
                customer_uid: "cust-1".into(),
                items: vec![OrderItem {
                    product_name: "Saree".into(),
                    quantity: 1,
                    price: Decimal::from(600),
                    return_policy: 7,
                }],
            },
        )
        .await
        .unwrap()
        .id
    }

    fn earning(order_id: i64, amount: Decimal) -> EarningCreate {
        EarningCreate {
            affiliate_uid: "aff-1".into(),
            order_id,
            order_number: "PM-1".into(),
            product_name: "Saree".into(),
            commission_amount: amount,
        }
    }

    #[tokio::test]
    async fn test_create_stores_exact_amount() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        let created = create(&pool, earning(order_id, Decimal::new(6050, 2))).await.unwrap();
        assert_eq!(created.status, EarningStatus::Pending);

        let found = find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.commission_amount, Decimal::new(605, 1));
        assert_eq!(found, AffiliateEarning { commission_amount: found.commission_amount, ..created });
    }

    #[tokio::test]
    async fn test_non_positive_commission_rejected() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        for amount in [Decimal::from(-1), Decimal::ZERO, Decimal::new(0, 2)] {
            let result = create_at(&pool, earning(order_id, amount), 1_000).await;
            assert!(matches!(result, Err(RepoError::Validation(_))));
        }
        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM affiliate_earnings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 0);
        assert!(create_at(&pool, earning(order_id, Decimal::new(1, 2)), 1_000).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_paid_in_range_is_half_open() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        for at in [999, 1_000, 1_500, 2_000] {
            create_at(&pool, earning(order_id, Decimal::ONE), at).await.unwrap();
        }
        transition_for_order(&pool, order_id, EarningStatus::Pending, EarningStatus::Paid)
            .await
            .unwrap();

        let found = find_paid_in_range(&pool, "aff-1", 1_000, 2_000).await.unwrap();
        let times: Vec<i64> = found.iter().map(|e| e.created_at).collect();
        assert_eq!(times, vec![1_000, 1_500]);
        assert!(find_paid_in_range(&pool, "aff-2", 0, 5_000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transition_for_order_validates_direction() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        create(&pool, earning(order_id, Decimal::ONE)).await.unwrap();

        let invalid =
            transition_for_order(&pool, order_id, EarningStatus::Pending, EarningStatus::Withdrawn).await;
        assert!(matches!(invalid, Err(RepoError::Validation(_))));

        let moved = transition_for_order(&pool, order_id, EarningStatus::Pending, EarningStatus::Paid)
            .await
            .unwrap();
        assert_eq!(moved, 1);
        let again = transition_for_order(&pool, order_id, EarningStatus::Pending, EarningStatus::Paid)
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn test_mark_withdrawn_only_touches_paid_rows() {
        let pool = test_pool().await;
        let order_id = seed(&pool).await;
        let paid = create(&pool, earning(order_id, Decimal::ONE)).await.unwrap();
        transition_for_order(&pool, order_id, EarningStatus::Pending, EarningStatus::Paid)
            .await
            .unwrap();
        let pending = create(&pool, earning(order_id, Decimal::ONE)).await.unwrap();

        // Withdrawal row so the foreign key holds
        sqlx::query(
            "INSERT INTO withdrawals (id, affiliate_uid, amount, status, requested_at, payout_method, payout_account_number) \
             VALUES (77, 'aff-1', '1', 'pending', 0, 'bkash', '017')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let updated = mark_withdrawn(&mut conn, &[paid.id, pending.id], 77).await.unwrap();
        drop(conn);
        assert_eq!(updated, 1);

        let linked = find_by_withdrawal(&pool, 77).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, paid.id);
        assert_eq!(linked[0].status, EarningStatus::Withdrawn);
        let untouched = find_by_id(&pool, pending.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, EarningStatus::Pending);
        assert!(untouched.withdrawal_id.is_none());
    }
}
