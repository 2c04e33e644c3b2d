//! Pure membership decision function.
//!
//! # Invariants
//! - Never fails and never reads storage.
//! - Every distinct requested id receives exactly one outcome.
//! - Add capacity is checked sequentially in request order: each
//!   `MemberAdded` consumes one slot for the ids after it.

use crate::membership::outcome::{
    MembershipLog, MembershipOp, MembershipOutcome, MembershipSnapshot,
};
use crate::membership::MAX_PROJECTS_PER_USER;
use crate::model::user::UserId;
use std::collections::HashSet;

/// Decides the outcome of `op` for every id in `requested`.
///
/// Duplicate ids are evaluated once, at their first position. A repeated id
/// would otherwise consume capacity twice and produce a second insert for
/// the same pair.
pub fn evaluate(
    op: MembershipOp,
    snapshot: &MembershipSnapshot,
    requested: &[UserId],
) -> MembershipLog {
    let mut seen = HashSet::with_capacity(requested.len());
    let mut log = MembershipLog::with_capacity(requested.len());
    let mut member_count = snapshot.capacity.current_member_count;

    for &user_id in requested {
        if !seen.insert(user_id) {
            continue;
        }

        let outcome = match op {
            MembershipOp::Add => decide_add(snapshot, user_id, &mut member_count),
            MembershipOp::Remove => decide_remove(snapshot, user_id),
        };
        log.push(user_id, outcome);
    }

    log
}

fn decide_add(
    snapshot: &MembershipSnapshot,
    user_id: UserId,
    member_count: &mut u32,
) -> MembershipOutcome {
    let Some(candidate) = snapshot.candidates.get(&user_id) else {
        return MembershipOutcome::UserDoesNotExist;
    };

    if candidate.is_in_project {
        MembershipOutcome::AlreadyMember
    } else if candidate.project_count >= MAX_PROJECTS_PER_USER {
        MembershipOutcome::AlreadyInTwoProjects
    } else if *member_count >= snapshot.capacity.max_members {
        MembershipOutcome::MemberLimitReached
    } else {
        *member_count += 1;
        MembershipOutcome::MemberAdded
    }
}

fn decide_remove(snapshot: &MembershipSnapshot, user_id: UserId) -> MembershipOutcome {
    match snapshot.candidates.get(&user_id) {
        None => MembershipOutcome::UserDoesNotExist,
        Some(candidate) if !candidate.is_in_project => MembershipOutcome::NotAMember,
        Some(_) => MembershipOutcome::MemberRemoved,
    }
}
