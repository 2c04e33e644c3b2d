//! Project domain model.
//!
//! # Responsibility
//! - Define project records and their lifecycle status.
//!
//! # Invariants
//! - `max_members` is strictly positive.
//! - Status is independent of membership; membership logic never mutates it.

use crate::model::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

pub const PROJECT_NAME_MAX_CHARS: usize = 100;

/// Store-assigned project identifier.
pub type ProjectId = i64;

/// Project lifecycle status, persisted as `0 | 1 | 2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    ToBeStarted,
    InProgress,
    Completed,
}

impl ProjectStatus {
    /// Human-readable label used by reporting projections.
    pub fn label(self) -> &'static str {
        match self {
            Self::ToBeStarted => "To be started",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
        }
    }

    pub(crate) fn to_db(self) -> i64 {
        match self {
            Self::ToBeStarted => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    pub(crate) fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::ToBeStarted),
            1 => Some(Self::InProgress),
            2 => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Persisted project with its current member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub max_members: u32,
    /// Active users currently holding a membership row.
    pub member_count: u32,
}

impl Project {
    /// Returns whether another member can join.
    pub fn has_capacity(&self) -> bool {
        self.member_count < self.max_members
    }
}

/// Input for creating one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub max_members: u32,
    pub status: ProjectStatus,
}

impl NewProject {
    pub fn new(name: impl Into<String>, max_members: u32) -> Self {
        Self {
            name: name.into().trim().to_string(),
            max_members,
            status: ProjectStatus::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, PROJECT_NAME_MAX_CHARS)?;
        if self.max_members == 0 {
            return Err(ValidationError::NotPositive("max_members"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NewProject, ProjectStatus};
    use crate::model::ValidationError;

    #[test]
    fn status_db_mapping_is_stable() {
        for status in [
            ProjectStatus::ToBeStarted,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
        ] {
            assert_eq!(ProjectStatus::from_db(status.to_db()), Some(status));
        }
        assert_eq!(ProjectStatus::from_db(7), None);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let draft = NewProject::new("Apollo", 0);
        assert_eq!(
            draft.validate(),
            Err(ValidationError::NotPositive("max_members"))
        );
    }
}
