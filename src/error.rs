//! Error types returned by store operations and persistence adapters.

use chrono::NaiveDate;
use thiserror::Error;

/// Which collection an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Project,
    Task,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Entity::Project => "project",
            Entity::Task => "task",
        })
    }
}

/// Failure of a store operation. The store is left unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: String },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("hierarchy violation: {0}")]
    Integrity(#[from] IntegrityViolation),
}

impl StoreError {
    pub(crate) fn project(id: &str) -> Self {
        StoreError::NotFound { entity: Entity::Project, id: id.to_string() }
    }

    pub(crate) fn task(id: &str) -> Self {
        StoreError::NotFound { entity: Entity::Task, id: id.to_string() }
    }
}

/// Field-level input rejected before any mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,

    #[error("description is required")]
    EmptyDescription,

    #[error("end date {end} must be after start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("progress {0} is outside 0-100")]
    ProgressOutOfRange(u8),
}

/// A parent assignment that would break the task tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityViolation {
    #[error("task {0} cannot be its own parent")]
    SelfParent(String),

    #[error("parent task {0} does not exist")]
    ParentNotFound(String),

    #[error("parent task {parent} belongs to project {parent_project}, not {project}")]
    CrossProjectParent { parent: String, parent_project: String, project: String },

    #[error("making {parent} the parent of {task} would create a cycle")]
    Cycle { task: String, parent: String },
}

/// Failure reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
