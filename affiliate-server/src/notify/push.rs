//! Push gateway client
//!
//! Hands a notification to an external push webhook. Delivery to devices
//! is the gateway's business; a non-2xx answer is reported as an error.

use serde::Serialize;
use shared::models::NotificationPayload;
use std::time::Duration;

use super::NotifyError;

const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PushRequest<'a> {
    user_uid: &'a str,
    notification_id: i64,
    #[serde(flatten)]
    payload: &'a NotificationPayload,
}

#[derive(Clone)]
pub struct PushClient {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl PushClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Push(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            api_key,
            client,
        })
    }

    pub async fn send(
        &self,
        user_uid: &str,
        notification_id: i64,
        payload: &NotificationPayload,
    ) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.url).json(&PushRequest {
            user_uid,
            notification_id,
            payload,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| NotifyError::Push(format!("Push gateway unreachable: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Push(format!("Push rejected: {status} - {text}")));
        }
        Ok(())
    }
}
