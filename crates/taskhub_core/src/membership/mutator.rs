//! Applies decided membership outcomes to storage.
//!
//! # Invariants
//! - Only ids whose outcome `is_write` are written: `MemberAdded` on add,
//!   `MemberRemoved` on remove.
//! - All writes for one log go through a single writer call, so they share
//!   the caller's transaction.
//! - An empty write set performs no storage call.

use crate::membership::outcome::{MembershipLog, MembershipOp};
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::RepoResult;

/// Storage seam for membership row writes.
pub trait MembershipWriter {
    /// Inserts one row per id. Returns inserted row count.
    fn insert_members(&self, project_id: ProjectId, user_ids: &[UserId]) -> RepoResult<usize>;
    /// Deletes rows for the given ids if present. Returns deleted row count.
    fn delete_members(&self, project_id: ProjectId, user_ids: &[UserId]) -> RepoResult<usize>;
}

/// Writes the successful outcomes of `log` and returns affected row count.
pub fn apply_outcomes<W: MembershipWriter + ?Sized>(
    writer: &W,
    project_id: ProjectId,
    op: MembershipOp,
    log: &MembershipLog,
) -> RepoResult<usize> {
    let ids = log.write_ids();
    if ids.is_empty() {
        return Ok(0);
    }
    match op {
        MembershipOp::Add => writer.insert_members(project_id, &ids),
        MembershipOp::Remove => writer.delete_members(project_id, &ids),
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_outcomes, MembershipWriter};
    use crate::membership::outcome::{MembershipLog, MembershipOp, MembershipOutcome};
    use crate::model::project::ProjectId;
    use crate::model::user::UserId;
    use crate::repo::RepoResult;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingWriter {
        calls: RefCell<Vec<(&'static str, ProjectId, Vec<UserId>)>>,
    }

    impl MembershipWriter for RecordingWriter {
        fn insert_members(&self, project_id: ProjectId, user_ids: &[UserId]) -> RepoResult<usize> {
            self.calls
                .borrow_mut()
                .push(("insert", project_id, user_ids.to_vec()));
            Ok(user_ids.len())
        }

        fn delete_members(&self, project_id: ProjectId, user_ids: &[UserId]) -> RepoResult<usize> {
            self.calls
                .borrow_mut()
                .push(("delete", project_id, user_ids.to_vec()));
            Ok(user_ids.len())
        }
    }

    fn log_of(entries: &[(UserId, MembershipOutcome)]) -> MembershipLog {
        let mut log = MembershipLog::default();
        for &(id, outcome) in entries {
            log.push(id, outcome);
        }
        log
    }

    #[test]
    fn add_writes_only_added_ids_in_one_call() {
        let writer = RecordingWriter::default();
        let log = log_of(&[
            (1, MembershipOutcome::MemberAdded),
            (2, MembershipOutcome::AlreadyMember),
            (3, MembershipOutcome::MemberAdded),
            (4, MembershipOutcome::MemberLimitReached),
        ]);

        let written = apply_outcomes(&writer, 9, MembershipOp::Add, &log).unwrap();
        assert_eq!(written, 2);
        assert_eq!(*writer.calls.borrow(), vec![("insert", 9, vec![1, 3])]);
    }

    #[test]
    fn remove_writes_only_removed_ids() {
        let writer = RecordingWriter::default();
        let log = log_of(&[
            (1, MembershipOutcome::NotAMember),
            (2, MembershipOutcome::MemberRemoved),
            (3, MembershipOutcome::UserDoesNotExist),
        ]);

        apply_outcomes(&writer, 4, MembershipOp::Remove, &log).unwrap();
        assert_eq!(*writer.calls.borrow(), vec![("delete", 4, vec![2])]);
    }

    #[test]
    fn no_successful_outcome_means_no_write() {
        let writer = RecordingWriter::default();
        let log = log_of(&[(1, MembershipOutcome::AlreadyInTwoProjects)]);

        let written = apply_outcomes(&writer, 1, MembershipOp::Add, &log).unwrap();
        assert_eq!(written, 0);
        assert!(writer.calls.borrow().is_empty());
    }
}
