//! Cross-entity rollups over projects and their members.
//!
//! Rows come back from one ordered join and are grouped here, so each
//! report costs a single query.

use crate::model::project::{ProjectId, ProjectStatus};
use crate::model::user::UserId;
use crate::repo::{ensure_schema_ready, parse_count, RepoError, RepoResult};
use rusqlite::{Connection, Row};
use serde::Serialize;

/// One member's to-do counts inside a project report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberTodoStatsRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub pending_count: u32,
    pub completed_count: u32,
}

/// Per-project member to-do report. Members are ordered by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReportRow {
    pub project_title: String,
    pub report: Vec<MemberTodoStatsRow>,
}

/// Project names of one user grouped by project status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProjectsRow {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub to_do_projects: Vec<String>,
    pub in_progress_projects: Vec<String>,
    pub completed_projects: Vec<String>,
}

/// Short project view used by member-name lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectNameRow {
    pub project_name: String,
    pub done: bool,
    pub max_members: u32,
}

/// Builds the member to-do report of every project, ordered by project id.
///
/// Projects without members carry an empty `report`.
pub fn project_wise_report(conn: &Connection) -> RepoResult<Vec<ProjectReportRow>> {
    ensure_schema_ready(conn)?;
    let mut stmt = conn.prepare(
        "SELECT
            p.id AS project_id,
            p.name AS project_title,
            u.first_name AS first_name,
            u.last_name AS last_name,
            u.email AS email,
            (
                SELECT COUNT(*)
                FROM todos t
                WHERE t.user_id = u.id AND t.deleted = 0 AND t.done = 0
            ) AS pending_count,
            (
                SELECT COUNT(*)
                FROM todos t
                WHERE t.user_id = u.id AND t.deleted = 0 AND t.done = 1
            ) AS completed_count
         FROM projects p
         LEFT JOIN project_members pm ON pm.project_id = p.id
         LEFT JOIN users u ON u.id = pm.user_id AND u.deleted = 0
         ORDER BY p.id ASC, u.email ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut reports: Vec<(ProjectId, ProjectReportRow)> = Vec::new();
    while let Some(row) = rows.next()? {
        let project_id: ProjectId = row.get("project_id")?;
        if reports.last().map(|(id, _)| *id) != Some(project_id) {
            reports.push((
                project_id,
                ProjectReportRow {
                    project_title: row.get("project_title")?,
                    report: Vec::new(),
                },
            ));
        }

        let email: Option<String> = row.get("email")?;
        let (Some(email), Some((_, current))) = (email, reports.last_mut()) else {
            continue;
        };
        current.report.push(MemberTodoStatsRow {
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email,
            pending_count: parse_count(row.get("pending_count")?, "pending_count")?,
            completed_count: parse_count(row.get("completed_count")?, "completed_count")?,
        });
    }
    Ok(reports.into_iter().map(|(_, report)| report).collect())
}

/// Groups each active user's project names by status, ordered by user id.
pub fn user_wise_project_status(conn: &Connection) -> RepoResult<Vec<UserProjectsRow>> {
    ensure_schema_ready(conn)?;
    let mut stmt = conn.prepare(
        "SELECT
            u.id AS id,
            u.first_name AS first_name,
            u.last_name AS last_name,
            u.email AS email,
            p.name AS project_name,
            p.status AS status
         FROM users u
         LEFT JOIN project_members pm ON pm.user_id = u.id
         LEFT JOIN projects p ON p.id = pm.project_id
         WHERE u.deleted = 0
         ORDER BY u.id ASC, p.id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut users: Vec<UserProjectsRow> = Vec::new();
    while let Some(row) = rows.next()? {
        let user_id: UserId = row.get("id")?;
        if users.last().map(|user| user.id) != Some(user_id) {
            users.push(UserProjectsRow {
                id: user_id,
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
                email: row.get("email")?,
                to_do_projects: Vec::new(),
                in_progress_projects: Vec::new(),
                completed_projects: Vec::new(),
            });
        }

        let (Some(name), Some(status)) = (
            row.get::<_, Option<String>>("project_name")?,
            row.get::<_, Option<i64>>("status")?,
        ) else {
            continue;
        };
        let Some(current) = users.last_mut() else {
            continue;
        };
        let bucket = match parse_status(status)? {
            ProjectStatus::ToBeStarted => &mut current.to_do_projects,
            ProjectStatus::InProgress => &mut current.in_progress_projects,
            ProjectStatus::Completed => &mut current.completed_projects,
        };
        bucket.push(name);
    }
    Ok(users)
}

/// Lists projects with an active member whose first name starts with, or
/// whose last name ends with, `letter` (ASCII case-insensitive).
pub fn projects_with_member_name_edge(
    conn: &Connection,
    letter: char,
) -> RepoResult<Vec<ProjectNameRow>> {
    ensure_schema_ready(conn)?;
    let letter = letter.to_ascii_lowercase().to_string();
    let mut stmt = conn.prepare(
        "SELECT DISTINCT
            p.id AS id,
            p.name AS project_name,
            p.status AS status,
            p.max_members AS max_members
         FROM projects p
         INNER JOIN project_members pm ON pm.project_id = p.id
         INNER JOIN users u ON u.id = pm.user_id
         WHERE u.deleted = 0
           AND (
               lower(substr(u.first_name, 1, 1)) = ?1
               OR lower(substr(u.last_name, -1, 1)) = ?1
           )
         ORDER BY p.id ASC;",
    )?;
    let mut rows = stmt.query([letter])?;
    let mut projects = Vec::new();
    while let Some(row) = rows.next()? {
        projects.push(parse_project_name(row)?);
    }
    Ok(projects)
}

fn parse_project_name(row: &Row<'_>) -> RepoResult<ProjectNameRow> {
    Ok(ProjectNameRow {
        project_name: row.get("project_name")?,
        done: parse_status(row.get("status")?)? == ProjectStatus::Completed,
        max_members: parse_count(row.get("max_members")?, "projects.max_members")?,
    })
}

fn parse_status(value: i64) -> RepoResult<ProjectStatus> {
    ProjectStatus::from_db(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{value}` in projects.status")))
}
