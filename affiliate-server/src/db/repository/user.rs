//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{PayoutInfo, User, UserCreate};
use sqlx::SqlitePool;

const USER_COLUMNS: &str =
    "uid, display_name, email, is_affiliate, payout_method, payout_account_number";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    uid: String,
    display_name: String,
    email: Option<String>,
    is_affiliate: bool,
    payout_method: Option<String>,
    payout_account_number: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let payout_info = row.payout_account_number.map(|account_number| PayoutInfo {
            method: row.payout_method.unwrap_or_default(),
            account_number,
        });
        User {
            uid: row.uid,
            display_name: row.display_name,
            email: row.email,
            is_affiliate: row.is_affiliate,
            payout_info,
        }
    }
}

pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    if data.uid.trim().is_empty() {
        return Err(RepoError::Validation("uid must not be empty".into()));
    }
    let now = shared::util::now_millis();
    let (method, account) = match &data.payout_info {
        Some(info) => (Some(info.method.as_str()), Some(info.account_number.as_str())),
        None => (None, None),
    };

    sqlx::query(
        "INSERT INTO users (uid, display_name, email, is_affiliate, payout_method, payout_account_number, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&data.uid)
    .bind(&data.display_name)
    .bind(&data.email)
    .bind(data.is_affiliate)
    .bind(method)
    .bind(account)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_uid(pool, &data.uid)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn find_by_uid(pool: &SqlitePool, uid: &str) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE uid = ?");
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(uid)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(User::from))
}

/// Every user flagged as affiliate, in uid order
pub async fn list_affiliates(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE is_affiliate = 1 ORDER BY uid");
    let rows = sqlx::query_as::<_, UserRow>(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(User::from).collect())
}

/// Replace (or clear) the payout destination
pub async fn update_payout_info(
    pool: &SqlitePool,
    uid: &str,
    payout_info: Option<&PayoutInfo>,
) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET payout_method = ?1, payout_account_number = ?2 WHERE uid = ?3",
    )
    .bind(payout_info.map(|p| p.method.as_str()))
    .bind(payout_info.map(|p| p.account_number.as_str()))
    .bind(uid)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {uid} not found")));
    }
    find_by_uid(pool, uid)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {uid} not found")))
}
