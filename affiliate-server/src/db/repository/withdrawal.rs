//! Withdrawal Repository

use super::{RepoError, RepoResult};
use shared::models::{PayoutInfo, Withdrawal, WithdrawalStatus};
use shared::money::{parse_amount, to_storage};
use sqlx::{SqliteConnection, SqlitePool};

const WITHDRAWAL_COLUMNS: &str =
    "id, affiliate_uid, amount, status, requested_at, payout_method, payout_account_number";

#[derive(Debug, sqlx::FromRow)]
struct WithdrawalRow {
    id: i64,
    affiliate_uid: String,
    amount: String,
    status: WithdrawalStatus,
    requested_at: i64,
    payout_method: String,
    payout_account_number: String,
}

impl TryFrom<WithdrawalRow> for Withdrawal {
    type Error = RepoError;

    fn try_from(row: WithdrawalRow) -> Result<Self, Self::Error> {
        Ok(Withdrawal {
            id: row.id,
            affiliate_uid: row.affiliate_uid,
            amount: parse_amount(&row.amount)?,
            status: row.status,
            requested_at: row.requested_at,
            payout_info: PayoutInfo {
                method: row.payout_method,
                account_number: row.payout_account_number,
            },
        })
    }
}

/// Insert on the caller's connection (joins the settlement transaction)
pub async fn insert(conn: &mut SqliteConnection, withdrawal: &Withdrawal) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO withdrawals \
         (id, affiliate_uid, amount, status, requested_at, payout_method, payout_account_number) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(withdrawal.id)
    .bind(&withdrawal.affiliate_uid)
    .bind(to_storage(withdrawal.amount))
    .bind(withdrawal.status)
    .bind(withdrawal.requested_at)
    .bind(&withdrawal.payout_info.method)
    .bind(&withdrawal.payout_info.account_number)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Withdrawal>> {
    let sql = format!("SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE id = ?");
    let row = sqlx::query_as::<_, WithdrawalRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Withdrawal::try_from).transpose()
}

/// Withdrawals of one affiliate, newest first
pub async fn list_by_affiliate(pool: &SqlitePool, affiliate_uid: &str) -> RepoResult<Vec<Withdrawal>> {
    let sql = format!(
        "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE affiliate_uid = ? ORDER BY requested_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, WithdrawalRow>(&sql)
        .bind(affiliate_uid)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(Withdrawal::try_from).collect()
}
