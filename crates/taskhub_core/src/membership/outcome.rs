//! Membership batch inputs and outcome log types.

use crate::model::project::ProjectId;
use crate::model::user::UserId;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Batch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipOp {
    Add,
    Remove,
}

impl MembershipOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl Display for MembershipOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user result of one add/remove request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipOutcome {
    MemberAdded,
    AlreadyMember,
    AlreadyInTwoProjects,
    MemberLimitReached,
    UserDoesNotExist,
    MemberRemoved,
    NotAMember,
}

impl MembershipOutcome {
    /// Stable symbolic code.
    pub fn code(self) -> &'static str {
        match self {
            Self::MemberAdded => "MEMBER_ADDED",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::AlreadyInTwoProjects => "ALREADY_IN_TWO_PROJECTS",
            Self::MemberLimitReached => "MEMBER_LIMIT_REACHED",
            Self::UserDoesNotExist => "USER_DOES_NOT_EXIST",
            Self::MemberRemoved => "MEMBER_REMOVED",
            Self::NotAMember => "NOT_A_MEMBER",
        }
    }

    /// User-visible message. These strings are part of the API contract.
    pub fn message(self) -> &'static str {
        match self {
            Self::MemberAdded => "Member added Successfully",
            Self::AlreadyMember => "User is already a Member",
            Self::AlreadyInTwoProjects => "Cannot add as User is a member in two projects",
            Self::MemberLimitReached => "Member limit reached for this project",
            Self::UserDoesNotExist => "User not found",
            Self::MemberRemoved => "Member removed Successfully",
            Self::NotAMember => "User is not a Member",
        }
    }

    /// Returns whether this outcome requires a membership row write.
    pub fn is_write(self) -> bool {
        matches!(self, Self::MemberAdded | Self::MemberRemoved)
    }
}

/// Capacity view of the target project at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectCapacity {
    pub current_member_count: u32,
    pub max_members: u32,
}

/// Membership state of one candidate user at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateState {
    /// Memberships held in projects other than the target.
    pub project_count: u32,
    /// Whether a row for the target project already exists.
    pub is_in_project: bool,
}

/// Immutable read of everything one batch decision needs.
///
/// Users missing from `candidates` were not found (or are soft-deleted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSnapshot {
    pub project_id: ProjectId,
    pub capacity: ProjectCapacity,
    pub candidates: HashMap<UserId, CandidateState>,
}

/// Outcome per requested user id.
///
/// Keys are unique and kept in first-request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipLog {
    entries: Vec<(UserId, MembershipOutcome)>,
}

impl MembershipLog {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, user_id: UserId, outcome: MembershipOutcome) {
        self.entries.push((user_id, outcome));
    }

    /// Outcome recorded for `user_id`, if it was requested.
    pub fn get(&self, user_id: UserId) -> Option<MembershipOutcome> {
        self.entries
            .iter()
            .find(|(id, _)| *id == user_id)
            .map(|(_, outcome)| *outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserId, MembershipOutcome)> + '_ {
        self.entries.iter().copied()
    }

    /// Ids whose outcome needs a row write, in request order.
    pub fn write_ids(&self) -> Vec<UserId> {
        self.entries
            .iter()
            .filter(|(_, outcome)| outcome.is_write())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids whose outcome equals `outcome`, in request order.
    pub fn ids_with(&self, outcome: MembershipOutcome) -> Vec<UserId> {
        self.entries
            .iter()
            .filter(|(_, value)| *value == outcome)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of entries with `outcome`.
    pub fn count(&self, outcome: MembershipOutcome) -> usize {
        self.entries
            .iter()
            .filter(|(_, value)| *value == outcome)
            .count()
    }
}
