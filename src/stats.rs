//! Aggregate statistics derived from the task collection.
//!
//! Everything here is recomputed from scratch on each call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fields::{Priority, ProjectStatus, TaskStatus};
use crate::project::Project;
use crate::task::Task;

/// Count per task status; every status is present, possibly with zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub todo: usize,
    #[serde(rename = "in-progress")]
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }
}

/// Count per priority; every priority is present, possibly with zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub urgent: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
            Priority::Urgent => self.urgent,
        }
    }
}

/// Statistics for one project and its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: usize,
    pub status_counts: StatusCounts,
    pub priority_counts: PriorityCounts,
    /// Rounded percentage of completed tasks, 0 for an empty project.
    pub completion_rate: u8,
    pub overdue_count: usize,
    pub urgent_count: usize,
    pub urgent_open_count: usize,
    pub team_size: usize,
}

pub fn status_counts<'a, I: IntoIterator<Item = &'a Task>>(tasks: I) -> StatusCounts {
    let mut c = StatusCounts { todo: 0, in_progress: 0, completed: 0 };
    for t in tasks {
        match t.status {
            TaskStatus::Todo => c.todo += 1,
            TaskStatus::InProgress => c.in_progress += 1,
            TaskStatus::Completed => c.completed += 1,
        }
    }
    c
}

pub fn priority_counts<'a, I: IntoIterator<Item = &'a Task>>(tasks: I) -> PriorityCounts {
    let mut c = PriorityCounts { low: 0, medium: 0, high: 0, urgent: 0 };
    for t in tasks {
        match t.priority {
            Priority::Low => c.low += 1,
            Priority::Medium => c.medium += 1,
            Priority::High => c.high += 1,
            Priority::Urgent => c.urgent += 1,
        }
    }
    c
}

/// `completed / total` as a rounded percentage.
pub fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Round half up in integer arithmetic.
    ((completed * 200 + total) / (total * 2)).min(100) as u8
}

pub fn overdue_count<'a, I: IntoIterator<Item = &'a Task>>(tasks: I, now: DateTime<Utc>) -> usize {
    tasks.into_iter().filter(|t| t.is_overdue(now)).count()
}

pub fn urgent_open_count<'a, I: IntoIterator<Item = &'a Task>>(tasks: I) -> usize {
    tasks
        .into_iter()
        .filter(|t| t.priority == Priority::Urgent && !t.is_completed())
        .count()
}

/// Compute every statistic for `project` over the tasks that belong to it.
///
/// `tasks` may be the whole collection; tasks of other projects are ignored.
pub fn project_stats(project: &Project, tasks: &[Task], now: DateTime<Utc>) -> ProjectStats {
    let own: Vec<&Task> = tasks.iter().filter(|t| t.project_id == project.id).collect();
    let status_counts = status_counts(own.iter().copied());
    let priority_counts = priority_counts(own.iter().copied());
    ProjectStats {
        total: own.len(),
        completion_rate: completion_rate(status_counts.completed, own.len()),
        overdue_count: overdue_count(own.iter().copied(), now),
        urgent_count: priority_counts.urgent,
        urgent_open_count: urgent_open_count(own.iter().copied()),
        team_size: project.team_members.len(),
        status_counts,
        priority_counts,
    }
}

/// Dashboard totals across every project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_projects: usize,
    pub projects_by_status: BTreeMap<String, usize>,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Tasks still `todo` or `in-progress`.
    pub pending_tasks: usize,
}

pub fn overview(projects: &[Project], tasks: &[Task]) -> Overview {
    let mut by_status = BTreeMap::new();
    for p in projects {
        *by_status.entry(p.status.to_string()).or_default() += 1;
    }
    let counts = status_counts(tasks);
    Overview {
        total_projects: projects.len(),
        active_projects: projects.iter().filter(|p| p.status == ProjectStatus::Active).count(),
        projects_by_status: by_status,
        total_tasks: tasks.len(),
        completed_tasks: counts.completed,
        pending_tasks: counts.todo + counts.in_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::NewProject;
    use crate::task::NewTask;
    use chrono::{NaiveDate, TimeZone};

    fn project(id: &str) -> Project {
        let mut data = NewProject::new(
            "P",
            "desc",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        data.team_members = vec!["Ann".into(), "Bob".into(), "Ann".into()];
        Project::from_new(id.into(), data, Utc::now())
    }

    fn task(
        id: usize,
        project: &str,
        status: TaskStatus,
        priority: Priority,
        due: Option<NaiveDate>,
    ) -> Task {
        let mut data = NewTask::new(project, format!("t{id}"));
        data.status = status;
        data.priority = priority;
        data.due_date = due;
        Task::from_new(id.to_string(), data, Utc::now())
    }

    #[test]
    fn test_status_counts_and_completion_rate() {
        let statuses = [
            TaskStatus::Completed, TaskStatus::Completed, TaskStatus::Completed,
            TaskStatus::Todo, TaskStatus::Todo, TaskStatus::InProgress,
        ];
        let tasks: Vec<Task> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| task(i, "p", *s, Priority::Low, None))
            .collect();
        let stats = project_stats(&project("p"), &tasks, Utc::now());
        assert_eq!(stats.status_counts, StatusCounts { todo: 2, in_progress: 1, completed: 3 });
        assert_eq!(stats.completion_rate, 50);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.team_size, 3);
    }

    #[test]
    fn test_empty_project_has_zero_rate() {
        let stats = project_stats(&project("p"), &[], Utc::now());
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.priority_counts.get(Priority::Urgent), 0);
    }

    #[test]
    fn test_completion_rate_rounds() {
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(4, 4), 100);
    }

    #[test]
    fn test_overdue_and_urgent_only_count_open_tasks() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 2, 1);
        let future = NaiveDate::from_ymd_opt(2024, 3, 1);
        let tasks = vec![
            task(1, "p", TaskStatus::Todo, Priority::Urgent, past),
            task(2, "p", TaskStatus::Completed, Priority::Urgent, past),
            task(3, "p", TaskStatus::InProgress, Priority::High, future),
            task(4, "other", TaskStatus::Todo, Priority::Urgent, past),
        ];
        let stats = project_stats(&project("p"), &tasks, now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.overdue_count, 1);
        assert_eq!(stats.urgent_count, 2);
        assert_eq!(stats.urgent_open_count, 1);
        assert_eq!(stats.priority_counts, PriorityCounts { low: 0, medium: 0, high: 1, urgent: 2 });
    }

    #[test]
    fn test_overview() {
        let mut on_hold = project("b");
        on_hold.status = ProjectStatus::OnHold;
        let projects = vec![project("a"), on_hold];
        let tasks = vec![
            task(1, "a", TaskStatus::Completed, Priority::Low, None),
            task(2, "a", TaskStatus::Todo, Priority::Low, None),
            task(3, "b", TaskStatus::InProgress, Priority::Low, None),
        ];
        let o = overview(&projects, &tasks);
        assert_eq!(o.total_projects, 2);
        assert_eq!(o.active_projects, 1);
        assert_eq!(o.projects_by_status.get("on-hold"), Some(&1));
        assert_eq!(o.completed_tasks, 1);
        assert_eq!(o.pending_tasks, 2);
    }
}
