//! SQL-backed report queries.

use crate::model::project::{ProjectId, ProjectStatus};
use crate::model::todo::{status_label, TodoId};
use crate::model::user::UserId;
use crate::repo::{ensure_schema_ready, parse_count, parse_flag, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// Default row count for [`top_pending_users`].
pub const TOP_PENDING_DEFAULT_LIMIT: u32 = 5;

/// One project with its status label and active member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDetailsRow {
    pub id: ProjectId,
    pub name: String,
    pub status: String,
    pub existing_member_count: u32,
    pub max_members: u32,
}

/// Completed and pending to-do counts for one active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserTodoStatsRow {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub completed_count: u32,
    pub pending_count: u32,
}

/// Creator details nested into to-do listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoCreator {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Active to-do with its status label and nested creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoWithCreatorRow {
    pub id: TodoId,
    pub name: String,
    pub status: String,
    pub date_created: i64,
    pub creator: TodoCreator,
}

/// Completed to-do joined with its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedTodoRow {
    pub id: TodoId,
    pub name: String,
    pub creator: String,
    pub email: String,
    pub date_created: i64,
    pub date_completed: Option<i64>,
}

const USER_STATS_SELECT_SQL: &str = "SELECT
    u.id AS id,
    u.first_name AS first_name,
    u.last_name AS last_name,
    u.email AS email,
    COUNT(CASE WHEN t.done = 1 THEN 1 END) AS completed_count,
    COUNT(CASE WHEN t.done = 0 THEN 1 END) AS pending_count
FROM users u
LEFT JOIN todos t ON t.user_id = u.id AND t.deleted = 0
WHERE u.deleted = 0
GROUP BY u.id";

/// Lists every project ordered by id.
pub fn project_details(conn: &Connection) -> RepoResult<Vec<ProjectDetailsRow>> {
    ensure_schema_ready(conn)?;
    let mut stmt = conn.prepare(
        "SELECT
            p.id AS id,
            p.name AS name,
            p.status AS status,
            p.max_members AS max_members,
            (
                SELECT COUNT(*)
                FROM project_members pm
                WHERE pm.project_id = p.id
            ) AS existing_member_count
         FROM projects p
         ORDER BY p.id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut details = Vec::new();
    while let Some(row) = rows.next()? {
        details.push(parse_project_details(row)?);
    }
    Ok(details)
}

/// Lists to-do counts for every active user ordered by id.
pub fn user_todo_stats(conn: &Connection) -> RepoResult<Vec<UserTodoStatsRow>> {
    ensure_schema_ready(conn)?;
    let mut stmt = conn.prepare(&format!("{USER_STATS_SELECT_SQL} ORDER BY u.id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut stats = Vec::new();
    while let Some(row) = rows.next()? {
        stats.push(parse_user_stats(row)?);
    }
    Ok(stats)
}

/// Lists active users with exactly `pending` pending to-dos, ordered by id.
pub fn users_with_pending_count(
    conn: &Connection,
    pending: u32,
) -> RepoResult<Vec<UserTodoStatsRow>> {
    ensure_schema_ready(conn)?;
    let mut stmt = conn.prepare(&format!(
        "{USER_STATS_SELECT_SQL} HAVING pending_count = ?1 ORDER BY u.id ASC;"
    ))?;
    let mut rows = stmt.query([i64::from(pending)])?;
    let mut stats = Vec::new();
    while let Some(row) = rows.next()? {
        stats.push(parse_user_stats(row)?);
    }
    Ok(stats)
}

/// Lists every active to-do with its creator, ordered by id.
pub fn todos_with_creator(conn: &Connection) -> RepoResult<Vec<TodoWithCreatorRow>> {
    ensure_schema_ready(conn)?;
    let mut stmt = conn.prepare(
        "SELECT
            t.id AS id,
            t.name AS name,
            t.done AS done,
            t.date_created AS date_created,
            u.first_name AS first_name,
            u.last_name AS last_name,
            u.email AS email
         FROM todos t
         INNER JOIN users u ON u.id = t.user_id
         WHERE t.deleted = 0
           AND u.deleted = 0
         ORDER BY t.id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut todos = Vec::new();
    while let Some(row) = rows.next()? {
        let done = parse_flag(row.get("done")?, "todos.done")?;
        todos.push(TodoWithCreatorRow {
            id: row.get("id")?,
            name: row.get("name")?,
            status: status_label(done).to_string(),
            date_created: row.get("date_created")?,
            creator: TodoCreator {
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
                email: row.get("email")?,
            },
        });
    }
    Ok(todos)
}

/// Returns users with the most pending to-dos.
///
/// `None` applies [`TOP_PENDING_DEFAULT_LIMIT`]. Ties break by user id.
pub fn top_pending_users(
    conn: &Connection,
    limit: Option<u32>,
) -> RepoResult<Vec<UserTodoStatsRow>> {
    ensure_schema_ready(conn)?;
    let limit = limit.unwrap_or(TOP_PENDING_DEFAULT_LIMIT);
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(&format!(
        "{USER_STATS_SELECT_SQL} ORDER BY pending_count DESC, u.id ASC LIMIT ?1;"
    ))?;
    let mut rows = stmt.query([i64::from(limit)])?;
    let mut stats = Vec::new();
    while let Some(row) = rows.next()? {
        stats.push(parse_user_stats(row)?);
    }
    Ok(stats)
}

/// Lists completed to-dos created in `[start_ms, end_ms]`, oldest first.
///
/// An inverted range yields no rows.
pub fn completed_todos_between(
    conn: &Connection,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<Vec<CompletedTodoRow>> {
    ensure_schema_ready(conn)?;
    if start_ms > end_ms {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT
            t.id AS id,
            t.name AS name,
            u.first_name AS first_name,
            u.last_name AS last_name,
            u.email AS email,
            t.date_created AS date_created,
            t.date_completed AS date_completed
         FROM todos t
         INNER JOIN users u ON u.id = t.user_id
         WHERE t.done = 1
           AND t.deleted = 0
           AND u.deleted = 0
           AND t.date_created BETWEEN ?1 AND ?2
         ORDER BY t.date_created ASC, t.id ASC;",
    )?;
    let mut rows = stmt.query(params![start_ms, end_ms])?;
    let mut todos = Vec::new();
    while let Some(row) = rows.next()? {
        let first_name: String = row.get("first_name")?;
        let last_name: String = row.get("last_name")?;
        todos.push(CompletedTodoRow {
            id: row.get("id")?,
            name: row.get("name")?,
            creator: format!("{first_name} {last_name}").trim().to_string(),
            email: row.get("email")?,
            date_created: row.get("date_created")?,
            date_completed: row.get("date_completed")?,
        });
    }
    Ok(todos)
}

fn parse_project_details(row: &Row<'_>) -> RepoResult<ProjectDetailsRow> {
    let status_value: i64 = row.get("status")?;
    let status = ProjectStatus::from_db(status_value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_value}` in projects.status"))
    })?;

    Ok(ProjectDetailsRow {
        id: row.get("id")?,
        name: row.get("name")?,
        status: status.label().to_string(),
        existing_member_count: parse_count(
            row.get("existing_member_count")?,
            "existing_member_count",
        )?,
        max_members: parse_count(row.get("max_members")?, "projects.max_members")?,
    })
}

fn parse_user_stats(row: &Row<'_>) -> RepoResult<UserTodoStatsRow> {
    Ok(UserTodoStatsRow {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        completed_count: parse_count(row.get("completed_count")?, "completed_count")?,
        pending_count: parse_count(row.get("pending_count")?, "pending_count")?,
    })
}
