//! Notification Repository (in-app inbox)

use super::RepoResult;
use shared::models::{Notification, NotificationPayload};
use sqlx::SqlitePool;

pub async fn create(
    pool: &SqlitePool,
    user_uid: &str,
    payload: &NotificationPayload,
) -> RepoResult<Notification> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO notifications (id, user_uid, icon, title, description, href, is_read, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
    )
    .bind(id)
    .bind(user_uid)
    .bind(&payload.icon)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.href)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Notification {
        id,
        user_uid: user_uid.to_string(),
        icon: payload.icon.clone(),
        title: payload.title.clone(),
        description: payload.description.clone(),
        href: payload.href.clone(),
        is_read: false,
        created_at: now,
    })
}

/// Inbox of one user, newest first
pub async fn list_for_user(pool: &SqlitePool, user_uid: &str) -> RepoResult<Vec<Notification>> {
    let rows = sqlx::query_as::<_, Notification>(
        "SELECT id, user_uid, icon, title, description, href, is_read, created_at \
         FROM notifications WHERE user_uid = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_uid)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn mark_read(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
