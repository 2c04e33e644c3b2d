//! Project membership batch service.
//!
//! # Responsibility
//! - Run one add/remove batch as read snapshot -> decide -> write.
//! - Translate storage failures into membership-level errors.
//!
//! # Invariants
//! - Snapshot read and writes share one `BEGIN IMMEDIATE` transaction, so
//!   concurrent batches are serialized on the database write lock and the
//!   capacity check never sees a stale member count.
//! - A failed batch rolls back fully; nothing is retried here.
//! - Per-user business outcomes are results, not errors.

use crate::membership::{apply_outcomes, evaluate, MembershipLog, MembershipOp, MembershipOutcome};
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::project_repo::{MembershipStore, SqliteProjectRepository};
use crate::repo::RepoError;
use log::{debug, error, info};
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Request-level failures of a membership batch.
#[derive(Debug)]
pub enum MembershipError {
    /// No user ids were supplied.
    EmptyRequest,
    /// Target project does not exist.
    ProjectNotFound(ProjectId),
    /// The write lock could not be acquired; the whole batch may be retried.
    Conflict(RepoError),
    Repo(RepoError),
}

impl Display for MembershipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRequest => write!(f, "user_ids cannot be empty"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Conflict(err) => write!(f, "membership batch conflicted, retry: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MembershipError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conflict(err) | Self::Repo(err) => Some(err),
            Self::EmptyRequest | Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for MembershipError {
    fn from(value: RepoError) -> Self {
        if value.is_lock_conflict() {
            Self::Conflict(value)
        } else {
            Self::Repo(value)
        }
    }
}

impl From<rusqlite::Error> for MembershipError {
    fn from(value: rusqlite::Error) -> Self {
        RepoError::from(value).into()
    }
}

/// Membership service bound to one SQLite connection.
pub struct MembershipService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> MembershipService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Adds users to a project under the per-project and per-user caps.
    pub fn add_members(
        &mut self,
        project_id: ProjectId,
        user_ids: &[UserId],
    ) -> Result<MembershipLog, MembershipError> {
        self.run_batch(MembershipOp::Add, project_id, user_ids)
    }

    /// Removes users from a project.
    pub fn remove_members(
        &mut self,
        project_id: ProjectId,
        user_ids: &[UserId],
    ) -> Result<MembershipLog, MembershipError> {
        self.run_batch(MembershipOp::Remove, project_id, user_ids)
    }

    fn run_batch(
        &mut self,
        op: MembershipOp,
        project_id: ProjectId,
        user_ids: &[UserId],
    ) -> Result<MembershipLog, MembershipError> {
        if user_ids.is_empty() {
            return Err(MembershipError::EmptyRequest);
        }

        let started_at = Instant::now();
        match execute_batch(self.conn, op, project_id, user_ids) {
            Ok((log, written)) => {
                for (user_id, outcome) in log.iter() {
                    debug!(
                        "event=membership_outcome module=membership op={} project_id={} user_id={} code={} write={}",
                        op,
                        project_id,
                        user_id,
                        outcome.code(),
                        outcome.is_write()
                    );
                }
                info!(
                    "event=membership_batch module=membership status=ok op={} project_id={} requested={} decided={} written={} limit_reached={} duration_ms={}",
                    op,
                    project_id,
                    user_ids.len(),
                    log.len(),
                    written,
                    log.count(MembershipOutcome::MemberLimitReached),
                    started_at.elapsed().as_millis()
                );
                Ok(log)
            }
            Err(err) => {
                let error_code = match &err {
                    MembershipError::ProjectNotFound(_) => "project_not_found",
                    MembershipError::Conflict(_) => "lock_conflict",
                    _ => "storage_failure",
                };
                error!(
                    "event=membership_batch module=membership status=error op={} project_id={} requested={} duration_ms={} error_code={} error={}",
                    op,
                    project_id,
                    user_ids.len(),
                    started_at.elapsed().as_millis(),
                    error_code,
                    err
                );
                Err(err)
            }
        }
    }
}

fn execute_batch(
    conn: &mut Connection,
    op: MembershipOp,
    project_id: ProjectId,
    user_ids: &[UserId],
) -> Result<(MembershipLog, usize), MembershipError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let (log, written) = {
        let store = SqliteProjectRepository::try_new(&tx)?;
        run_with_store(&store, op, project_id, user_ids)?
    };

    tx.commit()?;
    Ok((log, written))
}

/// Runs one decided batch against any membership store.
///
/// Transaction scoping is the caller's job.
pub fn run_with_store<S: MembershipStore + ?Sized>(
    store: &S,
    op: MembershipOp,
    project_id: ProjectId,
    user_ids: &[UserId],
) -> Result<(MembershipLog, usize), MembershipError> {
    let snapshot = store
        .load_snapshot(project_id, user_ids)?
        .ok_or(MembershipError::ProjectNotFound(project_id))?;
    let log = evaluate(op, &snapshot, user_ids);
    let written = apply_outcomes(store, project_id, op, &log)?;
    Ok((log, written))
}
