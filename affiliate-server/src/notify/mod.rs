//! User notifications
//!
//! [`Notifier`] is the seam the settlement engine dispatches through.
//! [`NotificationDispatcher`] stores the notification in the user's inbox
//! and, when a gateway is configured, forwards it as a push.

pub mod push;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::NotificationPayload;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::repository::{RepoError, notification};
pub use push::PushClient;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to store notification: {0}")]
    Store(#[from] RepoError),

    #[error("{0}")]
    Push(String),
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::with_message(ErrorCode::NotificationFailed, err.to_string())
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_uid: &str, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    pool: SqlitePool,
    push: Option<PushClient>,
}

impl NotificationDispatcher {
    /// Inbox-only dispatcher
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, push: None }
    }

    pub fn with_push(mut self, push: PushClient) -> Self {
        self.push = Some(push);
        self
    }
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    async fn notify(&self, user_uid: &str, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let stored = notification::create(&self.pool, user_uid, payload).await?;
        tracing::debug!(user_uid = %user_uid, notification_id = stored.id, "Notification stored");

        if let Some(push) = &self.push {
            push.send(user_uid, stored.id, payload).await?;
            tracing::debug!(user_uid = %user_uid, notification_id = stored.id, "Push delivered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn payload() -> NotificationPayload {
        NotificationPayload {
            icon: "wallet".into(),
            title: "Withdrawal created".into(),
            description: "৳110.00".into(),
            href: "/affiliate".into(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_lands_in_inbox() {
        let pool = test_pool().await;
        let dispatcher = NotificationDispatcher::new(pool.clone());
        dispatcher.notify("aff-1", &payload()).await.unwrap();

        let inbox = notification::list_for_user(&pool, "aff-1").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].description, "৳110.00");
    }

    #[tokio::test]
    async fn test_push_failure_keeps_inbox_entry() {
        let pool = test_pool().await;
        let push = PushClient::new("http://127.0.0.1:9/push", None).unwrap();
        let dispatcher = NotificationDispatcher::new(pool.clone()).with_push(push);

        let err = dispatcher.notify("aff-1", &payload()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Push(_)));
        assert_eq!(AppError::from(err).code, ErrorCode::NotificationFailed);
        assert_eq!(notification::list_for_user(&pool, "aff-1").await.unwrap().len(), 1);
    }
}
