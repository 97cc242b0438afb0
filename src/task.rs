//! Task types mirrored from the Todoist REST v2 wire format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{self, Classification};

/// Due date attached to a task.
///
/// Todoist always provides a calendar date; the remaining fields are
/// kept as the remote sends them so the UI can render them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    pub date: NaiveDate,
    #[serde(default)]
    pub string: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Due {
    /// A plain date-only due, as produced by merging a partial update
    /// into a cached task.
    pub fn on_date(date: NaiveDate) -> Self {
        Self {
            date,
            string: date.format("%Y-%m-%d").to_string(),
            is_recurring: false,
            timezone: None,
        }
    }
}

/// A task as owned by the remote service.
///
/// The id is assigned remotely and immutable; everything else can be
/// mutated through partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    /// 1..=4, 4 is highest.
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Due>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Payload for creating a task. The remote assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

/// Partial update for an existing task.
///
/// Only the present fields are sent; the remote echoes nothing back,
/// so callers merge the same fields into their local copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl TaskUpdate {
    /// Merge the present fields into a cached task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(content) = &self.content {
            task.content = content.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due = Some(Due::on_date(due_date));
        }
    }
}

/// A task annotated with its derived classification.
///
/// The classification is never persisted anywhere; it is recomputed
/// from the task's own fields on every classification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTask {
    #[serde(flatten)]
    pub task: Task,
    #[serde(flatten)]
    pub classification: Classification,
}

impl ClassifiedTask {
    /// Classify a raw task at the given instant.
    pub fn classify(task: Task, now: DateTime<Utc>) -> Self {
        let classification = classify::classify(&task, now);
        Self {
            task,
            classification,
        }
    }
}
