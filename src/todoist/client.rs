//! Todoist REST v2 client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ServiceError, TaskService};
use crate::task::{NewTask, Task, TaskUpdate};

/// Default API root for the Todoist REST v2 API.
pub const TODOIST_API_URL: &str = "https://api.todoist.com/rest/v2";

/// Client for the Todoist REST v2 API.
///
/// Every request carries the bearer credential supplied at
/// construction. Authentication itself (obtaining the token) lives
/// outside this crate.
#[derive(Debug)]
pub struct TodoistClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TodoistClient {
    /// Create a client against the default API root.
    pub fn new(token: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_base_url(TODOIST_API_URL, token)
    }

    /// Create a client against a non-default API root (tests,
    /// proxies).
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ServiceError::Unauthorized(
                "Todoist API token is required".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Surface non-success responses as classified errors.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ServiceError::from_status(status, body))
    }
}

#[async_trait]
impl TaskService for TodoistClient {
    async fn list(&self) -> Result<Vec<Task>, ServiceError> {
        let url = self.url("/tasks");
        debug!(url = %url, "fetching tasks");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create(&self, new_task: &NewTask) -> Result<Task, ServiceError> {
        let url = self.url("/tasks");
        debug!(url = %url, content = %new_task.content, "creating task");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(new_task)
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn update(&self, id: &str, update: &TaskUpdate) -> Result<(), ServiceError> {
        let url = self.url(&format!("/tasks/{id}"));
        debug!(url = %url, "updating task");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(update)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let url = self.url(&format!("/tasks/{id}"));
        debug!(url = %url, "deleting task");

        let resp = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn complete(&self, id: &str) -> Result<(), ServiceError> {
        let url = self.url(&format!("/tasks/{id}/close"));
        debug!(url = %url, "completing task");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
