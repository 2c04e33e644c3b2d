//! Project membership decision and write logic.
//!
//! # Responsibility
//! - Decide a per-user outcome for add/remove batches from an immutable
//!   snapshot (`validator`).
//! - Apply only successful outcomes as one batch write (`mutator`).
//!
//! # Invariants
//! - A user belongs to at most `MAX_PROJECTS_PER_USER` projects.
//! - A project holds at most `max_members` members.
//! - A `(project, user)` pair occurs at most once.
//! - Decisions never touch storage; writes only follow decisions.

pub mod mutator;
pub mod outcome;
pub mod validator;

/// Global cap on simultaneous project memberships per user.
pub const MAX_PROJECTS_PER_USER: u32 = 2;

pub use mutator::{apply_outcomes, MembershipWriter};
pub use outcome::{
    CandidateState, MembershipLog, MembershipOp, MembershipOutcome, MembershipSnapshot,
    ProjectCapacity,
};
pub use validator::evaluate;
