//! Project records and the inputs used to create and edit them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::fields::{Priority, ProjectStatus};

/// Colour assigned when the caller does not pick one.
pub const DEFAULT_COLOR: &str = "#6366f1";

/// A top-level unit of work with its own timeline and team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Manually curated percentage, never derived from task completion.
    pub progress: u8,
    pub color: String,
    #[serde(default)]
    pub team_members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new project. Id, progress and creation time
/// are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub color: String,
    pub team_members: Vec<String>,
}

impl NewProject {
    /// Active, medium-priority project with the default colour and no team.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        NewProject {
            title: title.into(),
            description: description.into(),
            status: ProjectStatus::Active,
            priority: Priority::Medium,
            start_date,
            end_date,
            color: DEFAULT_COLOR.to_string(),
            team_members: Vec::new(),
        }
    }
}

/// Partial update merged field-by-field into an existing project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub color: Option<String>,
    pub team_members: Option<Vec<String>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProjectPatch::default()
    }
}

impl Project {
    pub(crate) fn from_new(id: String, data: NewProject, created_at: DateTime<Utc>) -> Self {
        Project {
            id,
            title: data.title.trim().to_string(),
            description: data.description.trim().to_string(),
            status: data.status,
            priority: data.priority,
            start_date: data.start_date,
            end_date: data.end_date,
            progress: 0,
            color: data.color,
            team_members: data.team_members,
            created_at,
        }
    }

    /// Copy of this project with `patch` applied. `id` and `created_at` never change.
    pub(crate) fn merged(&self, patch: ProjectPatch) -> Project {
        let mut p = self.clone();
        if let Some(t) = patch.title {
            p.title = t.trim().to_string();
        }
        if let Some(d) = patch.description {
            p.description = d.trim().to_string();
        }
        if let Some(s) = patch.status {
            p.status = s;
        }
        if let Some(pr) = patch.priority {
            p.priority = pr;
        }
        if let Some(d) = patch.start_date {
            p.start_date = d;
        }
        if let Some(d) = patch.end_date {
            p.end_date = d;
        }
        if let Some(pg) = patch.progress {
            p.progress = pg;
        }
        if let Some(c) = patch.color {
            p.color = c;
        }
        if let Some(m) = patch.team_members {
            p.team_members = m;
        }
        p
    }

    /// Check the record-level rules: required text, ordered dates, bounded progress.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if self.end_date <= self.start_date {
            return Err(ValidationError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        validate_progress(self.progress)
    }

    /// Case-insensitive substring match over title and description.
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || self.title.to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q)
    }
}

pub(crate) fn validate_progress(progress: u8) -> Result<(), ValidationError> {
    if progress > 100 {
        Err(ValidationError::ProgressOutOfRange(progress))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Project {
        let data = NewProject::new(
            " Website Redesign ",
            "Complete overhaul of company website",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        );
        Project::from_new("1".into(), data, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_from_new_trims_and_zeroes_progress() {
        let p = sample();
        assert_eq!(p.title, "Website Redesign");
        assert_eq!(p.progress, 0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_merge_keeps_identity() {
        let p = sample();
        let merged = p.merged(ProjectPatch {
            title: Some("Relaunch".into()),
            progress: Some(40),
            ..Default::default()
        });
        assert_eq!(merged.id, p.id);
        assert_eq!(merged.created_at, p.created_at);
        assert_eq!(merged.title, "Relaunch");
        assert_eq!(merged.progress, 40);
        assert_eq!(merged.description, p.description);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let mut p = sample();
        p.end_date = p.start_date;
        assert!(matches!(p.validate(), Err(ValidationError::InvalidDateRange { .. })));

        let mut p = sample();
        p.title = "   ".into();
        assert_eq!(p.validate(), Err(ValidationError::EmptyTitle));

        let mut p = sample();
        p.progress = 101;
        assert_eq!(p.validate(), Err(ValidationError::ProgressOutOfRange(101)));
    }

    #[test]
    fn test_snapshot_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let keys = [
            "id",
            "title",
            "description",
            "status",
            "priority",
            "startDate",
            "endDate",
            "progress",
            "color",
            "teamMembers",
            "createdAt",
        ];
        for key in keys {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["startDate"], "2024-01-15");
    }

    #[test]
    fn test_search_matches_description() {
        let p = sample();
        assert!(p.matches_search("OVERHAUL"));
        assert!(p.matches_search(""));
        assert!(!p.matches_search("mobile"));
    }
}
