//! Project and membership repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide project create/read/status APIs over `projects`.
//! - Read immutable membership snapshots and write membership rows.
//!
//! # Invariants
//! - Member counts include every membership row; soft delete removes a
//!   user's rows, so no row outlives an active member.
//! - Candidate lookups consider active users only.
//! - `project_count` in a snapshot counts memberships in OTHER projects.
//! - Snapshot reads and membership writes are transaction-agnostic: callers
//!   pass a `Transaction` (which derefs to `Connection`) to group them.

use crate::membership::{CandidateState, MembershipSnapshot, MembershipWriter, ProjectCapacity};
use crate::model::project::{NewProject, Project, ProjectId, ProjectStatus};
use crate::model::user::{User, UserId};
use crate::repo::user_repo::parse_user_row;
use crate::repo::{ensure_schema_ready, parse_count, parse_flag, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::{BTreeSet, HashMap};

/// Upper bound on rows bound into one multi-row statement.
const MEMBERSHIP_ROWS_PER_STATEMENT: usize = 200;

const PROJECT_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.name AS name,
    p.status AS status,
    p.max_members AS max_members,
    (
        SELECT COUNT(*)
        FROM project_members pm
        WHERE pm.project_id = p.id
    ) AS member_count
FROM projects p";

/// Repository interface for project records.
pub trait ProjectRepository {
    fn create_project(&self, draft: &NewProject) -> RepoResult<Project>;
    /// Loads one project with its active member count.
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Lists all projects ordered by id.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Lists active members of one project ordered by user id.
    fn list_members(&self, id: ProjectId) -> RepoResult<Vec<User>>;
    fn update_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<()>;
}

/// Read/write seam used by membership batches.
pub trait MembershipStore: MembershipWriter {
    /// Reads capacity and candidate state for one batch.
    ///
    /// Returns `None` when the project does not exist.
    fn load_snapshot(
        &self,
        project_id: ProjectId,
        user_ids: &[UserId],
    ) -> RepoResult<Option<MembershipSnapshot>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, draft: &NewProject) -> RepoResult<Project> {
        draft.validate()?;
        self.conn.execute(
            "INSERT INTO projects (name, max_members, status) VALUES (?1, ?2, ?3);",
            params![draft.name.as_str(), draft.max_members, draft.status.to_db()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_project(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("project {id} missing after insert")))
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE p.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY p.id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn list_members(&self, id: ProjectId) -> RepoResult<Vec<User>> {
        if self.get_project(id)?.is_none() {
            return Err(RepoError::not_found("project", id));
        }

        let mut stmt = self.conn.prepare(
            "SELECT
                u.id AS id,
                u.first_name AS first_name,
                u.last_name AS last_name,
                u.email AS email,
                u.password_hash AS password_hash,
                u.is_staff AS is_staff,
                u.date_joined AS date_joined,
                u.deleted AS deleted
             FROM project_members pm
             INNER JOIN users u ON u.id = pm.user_id
             WHERE pm.project_id = ?1
               AND u.deleted = 0
             ORDER BY u.id ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_user_row(row)?);
        }
        Ok(members)
    }

    fn update_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects SET status = ?1 WHERE id = ?2;",
            params![status.to_db(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("project", id));
        }
        Ok(())
    }
}

impl MembershipStore for SqliteProjectRepository<'_> {
    fn load_snapshot(
        &self,
        project_id: ProjectId,
        user_ids: &[UserId],
    ) -> RepoResult<Option<MembershipSnapshot>> {
        let Some(project) = self.get_project(project_id)? else {
            return Ok(None);
        };

        let unique_ids = user_ids.iter().copied().collect::<BTreeSet<_>>();
        let mut candidates = HashMap::with_capacity(unique_ids.len());
        let ids = unique_ids.into_iter().collect::<Vec<_>>();
        for chunk in ids.chunks(MEMBERSHIP_ROWS_PER_STATEMENT) {
            load_candidates(self.conn, project_id, chunk, &mut candidates)?;
        }

        Ok(Some(MembershipSnapshot {
            project_id,
            capacity: ProjectCapacity {
                current_member_count: project.member_count,
                max_members: project.max_members,
            },
            candidates,
        }))
    }
}

impl MembershipWriter for SqliteProjectRepository<'_> {
    fn insert_members(&self, project_id: ProjectId, user_ids: &[UserId]) -> RepoResult<usize> {
        let mut inserted = 0;
        for chunk in user_ids.chunks(MEMBERSHIP_ROWS_PER_STATEMENT) {
            let placeholders = vec!["(?, ?)"; chunk.len()].join(", ");
            let sql =
                format!("INSERT INTO project_members (project_id, user_id) VALUES {placeholders};");
            let bind_values = chunk
                .iter()
                .flat_map(|user_id| [Value::Integer(project_id), Value::Integer(*user_id)]);
            inserted += self.conn.execute(&sql, params_from_iter(bind_values))?;
        }
        Ok(inserted)
    }

    fn delete_members(&self, project_id: ProjectId, user_ids: &[UserId]) -> RepoResult<usize> {
        let mut deleted = 0;
        for chunk in user_ids.chunks(MEMBERSHIP_ROWS_PER_STATEMENT) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "DELETE FROM project_members
                 WHERE project_id = ?
                   AND user_id IN ({placeholders});"
            );
            let bind_values = std::iter::once(Value::Integer(project_id))
                .chain(chunk.iter().map(|user_id| Value::Integer(*user_id)));
            deleted += self.conn.execute(&sql, params_from_iter(bind_values))?;
        }
        Ok(deleted)
    }
}

fn load_candidates(
    conn: &Connection,
    project_id: ProjectId,
    user_ids: &[UserId],
    candidates: &mut HashMap<UserId, CandidateState>,
) -> RepoResult<()> {
    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let sql = format!(
        "SELECT
            u.id AS id,
            (
                SELECT COUNT(*)
                FROM project_members pm
                WHERE pm.user_id = u.id
                  AND pm.project_id <> ?
            ) AS project_count,
            EXISTS(
                SELECT 1
                FROM project_members pm
                WHERE pm.user_id = u.id
                  AND pm.project_id = ?
            ) AS is_in_project
         FROM users u
         WHERE u.deleted = 0
           AND u.id IN ({placeholders});"
    );
    let bind_values = [Value::Integer(project_id), Value::Integer(project_id)]
        .into_iter()
        .chain(user_ids.iter().map(|user_id| Value::Integer(*user_id)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    while let Some(row) = rows.next()? {
        let user_id: UserId = row.get("id")?;
        candidates.insert(
            user_id,
            CandidateState {
                project_count: parse_count(row.get("project_count")?, "project_count")?,
                is_in_project: parse_flag(row.get("is_in_project")?, "is_in_project")?,
            },
        );
    }
    Ok(())
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let status_value: i64 = row.get("status")?;
    let status = ProjectStatus::from_db(status_value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_value}` in projects.status"))
    })?;

    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        status,
        max_members: parse_count(row.get("max_members")?, "projects.max_members")?,
        member_count: parse_count(row.get("member_count")?, "member_count")?,
    })
}
