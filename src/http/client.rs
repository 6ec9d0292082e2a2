use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheError, CacheKey, QueryFetcher};
use crate::endpoint::{MutationFailed, PersistenceEndpoint};
use crate::organization::{DirectoryError, OrganizationDirectory};
use crate::reminder::{OrganizationInfo, Reminder, UpdateStatusRequest};

/// reqwest client for a server built with [`router`](super::router).
#[derive(Clone)]
pub struct HttpReminderClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpReminderClient {
    /// `base_url` without a trailing slash, e.g. `"http://127.0.0.1:3000"`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Path that serves the list stored under `key`: collection-scoped keys
    /// map to `/collections/<id>/reminders`, every other key to `/reminders`.
    fn list_path(key: &CacheKey) -> String {
        match key.collection_id() {
            Some(collection_id) => format!("/collections/{}/reminders", collection_id),
            None => "/reminders".to_string(),
        }
    }
}

/// Pull the `error` field out of an error body, falling back to the raw text.
async fn error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text)
}

#[async_trait]
impl PersistenceEndpoint for HttpReminderClient {
    async fn update_status(&self, request: UpdateStatusRequest) -> Result<Reminder, MutationFailed> {
        let response = self
            .http
            .post(self.url("/reminders/status"))
            .json(&request)
            .send()
            .await
            .map_err(|e| MutationFailed::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Reminder>()
                .await
                .map_err(|e| MutationFailed::Transport(e.to_string()));
        }

        let message = error_message(response).await;
        debug!(%status, %message, "status update rejected by server");
        Err(match status {
            StatusCode::NOT_FOUND => MutationFailed::NotFound(request.id),
            StatusCode::FORBIDDEN => MutationFailed::Forbidden {
                id: request.id,
                owner: request.created_by,
            },
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                MutationFailed::Rejected(message)
            }
            StatusCode::SERVICE_UNAVAILABLE => MutationFailed::Unavailable(message),
            other => MutationFailed::Transport(format!("unexpected status {}: {}", other, message)),
        })
    }
}

#[async_trait]
impl QueryFetcher for HttpReminderClient {
    async fn fetch(&self, key: &CacheKey) -> Result<Vec<Reminder>, CacheError> {
        let response = self
            .http
            .get(self.url(&Self::list_path(key)))
            .send()
            .await
            .map_err(|e| CacheError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(CacheError::Fetch(format!("{}: {}", status, message)));
        }
        response
            .json::<Vec<Reminder>>()
            .await
            .map_err(|e| CacheError::Fetch(e.to_string()))
    }
}

#[async_trait]
impl OrganizationDirectory for HttpReminderClient {
    async fn organization_info(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationInfo>, DirectoryError> {
        let response = self
            .http
            .get(self.url(&format!("/organizations/{}", org_id)))
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<OrganizationInfo>()
                .await
                .map(Some)
                .map_err(|e| DirectoryError::Unavailable(e.to_string())),
            status => Err(DirectoryError::Unavailable(format!(
                "{}: {}",
                status,
                error_message(response).await
            ))),
        }
    }
}
