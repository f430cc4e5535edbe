//! Affiliate Settings Repository (singleton document)

use super::{RepoError, RepoResult};
use shared::models::{AFFILIATE_SETTINGS_ID, AffiliateSettings};
use sqlx::SqlitePool;

/// Stored settings, `None` when the document was never written
pub async fn get(pool: &SqlitePool) -> RepoResult<Option<AffiliateSettings>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT data FROM settings WHERE id = ?")
        .bind(AFFILIATE_SETTINGS_ID)
        .fetch_optional(pool)
        .await?;

    row.map(|(data,)| {
        serde_json::from_str::<AffiliateSettings>(&data)
            .map_err(|e| RepoError::Corrupt(format!("affiliate settings: {e}")))
    })
    .transpose()
}

/// Stored settings or the built-in defaults
pub async fn get_or_default(pool: &SqlitePool) -> RepoResult<AffiliateSettings> {
    Ok(get(pool).await?.unwrap_or_default())
}

/// Validate and replace the settings document
pub async fn upsert(pool: &SqlitePool, settings: &AffiliateSettings) -> RepoResult<AffiliateSettings> {
    settings
        .validate()
        .map_err(|e| RepoError::Validation(e.message))?;

    let data = serde_json::to_string(settings)
        .map_err(|e| RepoError::Validation(format!("affiliate settings: {e}")))?;
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO settings (id, data, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT (id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
    )
    .bind(AFFILIATE_SETTINGS_ID)
    .bind(&data)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(settings.clone())
}
