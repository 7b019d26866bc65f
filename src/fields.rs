//! Enumerations and field types for projects and tasks.
//!
//! Serialized names match the snapshot format (`"in-progress"`, `"on-hold"`, ...)
//! so previously saved data keeps loading.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] =
        [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed];

    /// Status a task flips to when its completion checkbox is toggled.
    pub fn toggled(self) -> TaskStatus {
        match self {
            TaskStatus::Completed => TaskStatus::Todo,
            _ => TaskStatus::Completed,
        }
    }
}

/// Importance shared by projects and tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] =
        [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    /// Sort rank, most pressing first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// Where a dragged task lands relative to its drop target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    Before,
    After,
}

/// What happens to the descendants of a deleted task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    /// Descendants stay in the collection with a dangling parent reference.
    Orphan,
    /// Descendants are deleted together with the task.
    #[default]
    Cascade,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on-hold",
        })
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        })
    }
}

/// A single filter criterion: either everything, or one specific value.
///
/// Parses from and prints as `"all"` for the unfiltered case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterValue<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> FilterValue<T> {
    /// Whether `value` passes this criterion.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr> FromStr for FilterValue<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(FilterValue::All)
        } else {
            s.parse().map(FilterValue::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for FilterValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::All => f.write_str("all"),
            FilterValue::Only(v) => v.fmt(f),
        }
    }
}

macro_rules! value_enum_from_str {
    ($($ty:ty),*) => {$(
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as ValueEnum>::from_str(s.trim(), true)
            }
        }
    )*};
}

value_enum_from_str!(ProjectStatus, TaskStatus, Priority);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_snapshot_format() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!(serde_json::to_string(&ProjectStatus::OnHold).unwrap(), "\"on-hold\"");
        assert_eq!(serde_json::to_string(&Priority::Urgent).unwrap(), "\"urgent\"");
    }

    #[test]
    fn test_filter_value_parse() {
        assert_eq!("all".parse::<FilterValue<TaskStatus>>().unwrap(), FilterValue::All);
        assert_eq!(
            "in-progress".parse::<FilterValue<TaskStatus>>().unwrap(),
            FilterValue::Only(TaskStatus::InProgress)
        );
        assert!("sideways".parse::<FilterValue<Priority>>().is_err());
        assert_eq!(FilterValue::Only(Priority::High).to_string(), "high");
    }

    #[test]
    fn test_priority_rank_orders_urgent_first() {
        let mut all = Priority::ALL;
        all.sort_by_key(|p| p.rank());
        assert_eq!(all, [Priority::Urgent, Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn test_toggle_status() {
        assert_eq!(TaskStatus::Todo.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Todo);
    }
}
