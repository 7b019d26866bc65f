//! Filter state for task lists and the filtered views built from it.

use crate::fields::{FilterValue, Priority, ProjectStatus, TaskStatus};
use crate::project::Project;
use crate::task::Task;

/// Active task filter criteria. Every field defaults to "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub status: FilterValue<TaskStatus>,
    pub priority: FilterValue<Priority>,
    pub assignee: FilterValue<String>,
}

/// Partial update for [`TaskFilters`]; `None` keeps the current criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltersPatch {
    pub status: Option<FilterValue<TaskStatus>>,
    pub priority: Option<FilterValue<Priority>>,
    pub assignee: Option<FilterValue<String>>,
}

impl TaskFilters {
    pub fn merge(&mut self, patch: FiltersPatch) {
        if let Some(s) = patch.status {
            self.status = s;
        }
        if let Some(p) = patch.priority {
            self.priority = p;
        }
        if let Some(a) = patch.assignee {
            self.assignee = a;
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(&task.status)
            && self.priority.matches(&task.priority)
            && self.assignee.matches(&task.assignee)
    }

    pub fn is_unfiltered(&self) -> bool {
        *self == TaskFilters::default()
    }
}

/// Tasks passing `filters` and `search`, in collection order.
pub fn filter_tasks<'a, I>(tasks: I, filters: &TaskFilters, search: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| filters.matches(t) && t.matches_search(search))
        .collect()
}

/// Stable sort, urgent first.
pub fn sort_by_priority(tasks: &mut [&Task]) {
    tasks.sort_by_key(|t| t.priority.rank());
}

/// Projects matching `search` and an optional status.
pub fn filter_projects<'a>(
    projects: &'a [Project],
    status: &FilterValue<ProjectStatus>,
    search: &str,
) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| status.matches(&p.status) && p.matches_search(search))
        .collect()
}
