//! Remote task service boundary.
//!
//! [`TaskService`] is the seam the store depends on; [`TodoistClient`]
//! is the production implementation against the Todoist REST v2 API.
//! Everything behind this boundary is the system of record for task
//! existence and attributes; the rest of the crate only caches.

mod client;
mod error;

pub use client::{TodoistClient, TODOIST_API_URL};
pub use error::ServiceError;

use async_trait::async_trait;

use crate::task::{NewTask, Task, TaskUpdate};

/// Trait for the remote system of record for tasks.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Fetch every active task.
    async fn list(&self) -> Result<Vec<Task>, ServiceError>;

    /// Create a task; the remote assigns the id.
    async fn create(&self, new_task: &NewTask) -> Result<Task, ServiceError>;

    /// Apply a partial update. The remote echoes nothing back; callers
    /// merge the same fields locally.
    async fn update(&self, id: &str, update: &TaskUpdate) -> Result<(), ServiceError>;

    /// Permanently delete a task.
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// Mark a task complete.
    async fn complete(&self, id: &str) -> Result<(), ServiceError>;
}
