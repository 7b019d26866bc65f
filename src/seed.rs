//! Demo data loaded on first run when no snapshot exists yet.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::fields::{Priority, ProjectStatus, TaskStatus};
use crate::persist::Snapshot;
use crate::project::Project;
use crate::task::Task;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn stamp(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single().unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: &str,
    project_id: &str,
    title: &str,
    description: &str,
    status: TaskStatus,
    priority: Priority,
    due: NaiveDate,
    parent: Option<&str>,
    subtasks: &[&str],
    assignee: &str,
    created_at: DateTime<Utc>,
) -> Task {
    Task {
        id: id.into(),
        project_id: project_id.into(),
        title: title.into(),
        description: description.into(),
        status,
        priority,
        due_date: Some(due),
        parent_task_id: parent.map(str::to_string),
        subtasks: subtasks.iter().map(|s| s.to_string()).collect(),
        assignee: assignee.into(),
        created_at,
    }
}

/// Two sample projects and four tasks, one of them with two subtasks.
pub fn demo_snapshot(now: DateTime<Utc>) -> Snapshot {
    let projects = vec![
        Project {
            id: "1".into(),
            title: "Website Redesign".into(),
            description: "Complete overhaul of company website with modern design".into(),
            status: ProjectStatus::Active,
            priority: Priority::High,
            start_date: day(2024, 1, 15),
            end_date: day(2024, 3, 15),
            progress: 65,
            color: "#6366f1".into(),
            team_members: vec!["John Doe".into(), "Jane Smith".into()],
            created_at: now,
        },
        Project {
            id: "2".into(),
            title: "Mobile App Development".into(),
            description: "Native mobile application for iOS and Android platforms".into(),
            status: ProjectStatus::Active,
            priority: Priority::Urgent,
            start_date: day(2024, 2, 1),
            end_date: day(2024, 6, 1),
            progress: 30,
            color: "#8b5cf6".into(),
            team_members: vec!["Mike Johnson".into(), "Sarah Wilson".into()],
            created_at: now,
        },
    ];
    let tasks = vec![
        task(
            "1",
            "1",
            "Design Homepage Layout",
            "Create wireframes and mockups for the new homepage",
            TaskStatus::Completed,
            Priority::High,
            day(2024, 2, 1),
            None,
            &["2", "3"],
            "Jane Smith",
            stamp(2024, 1, 15),
        ),
        task(
            "2",
            "1",
            "Create Header Component",
            "Develop responsive header with navigation",
            TaskStatus::InProgress,
            Priority::Medium,
            day(2024, 2, 5),
            Some("1"),
            &[],
            "John Doe",
            stamp(2024, 1, 16),
        ),
        task(
            "3",
            "1",
            "Design Footer Layout",
            "Create footer with links and contact information",
            TaskStatus::Todo,
            Priority::Low,
            day(2024, 2, 10),
            Some("1"),
            &[],
            "Jane Smith",
            stamp(2024, 1, 17),
        ),
        task(
            "4",
            "2",
            "Setup Development Environment",
            "Configure React Native development environment",
            TaskStatus::Completed,
            Priority::Urgent,
            day(2024, 2, 5),
            None,
            &[],
            "Mike Johnson",
            stamp(2024, 2, 1),
        ),
    ];
    Snapshot { projects, tasks }
}
