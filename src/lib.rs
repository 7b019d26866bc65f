//! # Taskboard
//!
//! Project and task tracking with hierarchical subtasks.
//!
//! ## Key Features
//!
//! - **Projects** with a timeline, team and manually curated progress
//! - **Task tree**: tasks hang under parent tasks; each parent keeps an ordered
//!   `subtasks` index that the store keeps in sync with the children's parent links
//! - **Drag-style reordering**: move a task before or after another task, or drop it
//!   onto another project
//! - **Statistics**: status and priority counts, completion rate, overdue and open
//!   urgent tasks, recomputed on demand
//! - **Local snapshots**: the whole state is written as one JSON file after every change
//!
//! ## Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use taskboard::{JsonFileStore, NewProject, NewTask, Store};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = Store::open(JsonFileStore::new("board.json"))?;
//! let project = store.add_project(NewProject::new(
//!     "Website Redesign",
//!     "New landing page",
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//! ))?;
//! let homepage = store.add_task(NewTask::new(&project.id, "Homepage layout"))?;
//! store.add_task(NewTask::new(&project.id, "Header").under(&homepage.id))?;
//! println!("{:?}", store.project_stats(&project.id)?);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod fields;
pub mod filter;
pub mod hierarchy;
pub mod persist;
pub mod project;
pub mod seed;
pub mod shared;
pub mod stats;
pub mod store;
pub mod task;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Entity, IntegrityViolation, PersistError, StoreError, StoreResult, ValidationError};
pub use fields::{DeletePolicy, FilterValue, Position, Priority, ProjectStatus, TaskStatus};
pub use filter::{FiltersPatch, TaskFilters};
pub use hierarchy::{DropAction, DropTarget, TreeNode};
pub use persist::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use project::{NewProject, Project, ProjectPatch};
pub use shared::SharedStore;
pub use stats::{Overview, ProjectStats};
pub use store::{SaveStatus, Store, StoreEvent};
pub use task::{NewTask, Task, TaskPatch};
