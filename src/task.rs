//! Task data structure and related functionality.
//!
//! A `Task` belongs to one project and optionally hangs under a parent task.
//! The `subtasks` list on each task is an index of its children kept in sync
//! by the store; callers can read it but never edit it directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::fields::{Priority, TaskStatus};

/// A unit of work belonging to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default, deserialize_with = "blank_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub parent_task_id: Option<String>,
    /// Child ids in attachment order.
    #[serde(default)]
    pub subtasks: Vec<String>,
    #[serde(default)]
    pub assignee: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub parent_task_id: Option<String>,
    pub assignee: String,
}

impl NewTask {
    /// A root `todo` task of medium priority.
    pub fn new(project_id: impl Into<String>, title: impl Into<String>) -> Self {
        NewTask {
            project_id: project_id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            due_date: None,
            parent_task_id: None,
            assignee: String::new(),
        }
    }

    /// Same task, attached under `parent`.
    pub fn under(mut self, parent: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent.into());
        self
    }
}

/// Partial update for a task.
///
/// `parent_task_id` is doubly optional: `None` leaves the parent alone,
/// `Some(None)` detaches the task to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub parent_task_id: Option<Option<String>>,
    pub assignee: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    pub fn status(status: TaskStatus) -> Self {
        TaskPatch { status: Some(status), ..Default::default() }
    }

    pub fn parent(parent: Option<String>) -> Self {
        TaskPatch { parent_task_id: Some(parent), ..Default::default() }
    }
}

impl Task {
    pub(crate) fn from_new(id: String, data: NewTask, created_at: DateTime<Utc>) -> Self {
        Task {
            id,
            project_id: data.project_id,
            title: data.title.trim().to_string(),
            description: data.description,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            parent_task_id: data.parent_task_id,
            subtasks: Vec::new(),
            assignee: data.assignee,
            created_at,
        }
    }

    /// Copy with `patch` applied. `id`, `created_at` and `subtasks` are left for the store.
    pub(crate) fn merged(&self, patch: TaskPatch) -> Task {
        let mut t = self.clone();
        if let Some(p) = patch.project_id {
            t.project_id = p;
        }
        if let Some(s) = patch.title {
            t.title = s.trim().to_string();
        }
        if let Some(d) = patch.description {
            t.description = d;
        }
        if let Some(s) = patch.status {
            t.status = s;
        }
        if let Some(p) = patch.priority {
            t.priority = p;
        }
        if let Some(d) = patch.due_date {
            t.due_date = d;
        }
        if let Some(p) = patch.parent_task_id {
            t.parent_task_id = p;
        }
        if let Some(a) = patch.assignee {
            t.assignee = a;
        }
        t
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn is_root(&self) -> bool {
        self.parent_task_id.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Past due and still open. A due date counts from midnight UTC of that day.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(d) if !self.is_completed() => d.and_time(chrono::NaiveTime::MIN).and_utc() < now,
            _ => false,
        }
    }

    /// Case-insensitive substring match over title and description.
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || self.title.to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q)
    }
}

/// Accept `""` or `null` as "no due date"; older snapshots wrote blank form fields.
fn blank_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
