//! REST client for the task service.
//!
//! | Method | Path           | Body                        |
//! |--------|----------------|-----------------------------|
//! | GET    | `/tasks`       |                             |
//! | POST   | `/tasks`       | task input                  |
//! | PUT    | `/tasks/{id}`  | full task input             |
//! | PATCH  | `/tasks/{id}`  | partial fields              |
//! | DELETE | `/tasks/{id}`  |                             |
//! | PATCH  | `/tasks/order` | `{category, tasks}`         |
//! | PATCH  | `/tasks/move`  | `{taskId, category, tasks}` |
//!
//! The service does not take an auth token; none is sent. Listed records
//! that do not decode as a task are skipped with a warning.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use super::TaskStore;
use crate::error::{BoardError, Result, TransportError};
use crate::models::{Category, Task, TaskId, TaskInput, TaskPatch};

#[derive(Serialize)]
struct OrderBody<'a> {
    category: Category,
    tasks: &'a [TaskId],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveBody<'a> {
    task_id: &'a TaskId,
    category: Category,
    tasks: &'a [TaskId],
}

/// Task store backed by the REST service.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    base_url: String,
    client: Client,
}

impl HttpTaskStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps non-success statuses to errors. A 404 on a task URL means the
    /// task is gone.
    async fn check(response: Response, id: Option<&TaskId>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(BoardError::not_found(id));
            }
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let url = self.url("/tasks");
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        let response = Self::check(response, None).await?;
        let records: Vec<serde_json::Value> = response.json().await?;
        let total = records.len();
        let tasks: Vec<Task> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Task>(record) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(error = %e, "skipping task record that cannot be placed on the board");
                    None
                }
            })
            .collect();
        debug!(count = tasks.len(), skipped = total - tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task> {
        let url = self.url("/tasks");
        debug!(%url, title = %input.title, "POST");
        let response = self.client.post(&url).json(input).send().await?;
        let response = Self::check(response, None).await?;
        Ok(response.json().await?)
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>> {
        if patch.is_empty() {
            return Ok(None);
        }
        let url = self.url(&format!("/tasks/{}", id));
        match patch.to_input() {
            Some(input) => {
                debug!(%url, "PUT");
                let response = self.client.put(&url).json(&input).send().await?;
                let response = Self::check(response, Some(id)).await?;
                // Some deployments answer with a write summary instead of the task.
                let body = response.text().await?;
                Ok(serde_json::from_str::<Task>(&body).ok())
            }
            None => {
                debug!(%url, "PATCH");
                let response = self.client.patch(&url).json(patch).send().await?;
                Self::check(response, Some(id)).await?;
                Ok(None)
            }
        }
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let url = self.url(&format!("/tasks/{}", id));
        debug!(%url, "DELETE");
        let response = self.client.delete(&url).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn reorder_within_category(&self, category: Category, ordered_ids: &[TaskId]) -> Result<()> {
        let url = self.url("/tasks/order");
        debug!(%url, %category, count = ordered_ids.len(), "PATCH order");
        let body = OrderBody {
            category,
            tasks: ordered_ids,
        };
        let response = self.client.patch(&url).json(&body).send().await?;
        Self::check(response, None).await?;
        Ok(())
    }

    async fn move_across_category(
        &self,
        id: &TaskId,
        category: Category,
        ordered_ids: &[TaskId],
    ) -> Result<()> {
        let url = self.url("/tasks/move");
        debug!(%url, %id, %category, "PATCH move");
        let body = MoveBody {
            task_id: id,
            category,
            tasks: ordered_ids,
        };
        let response = self.client.patch(&url).json(&body).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
