//! To-do repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide per-owner CRUD over `todos`.
//!
//! # Invariants
//! - Every query is scoped to one owner; another user's to-do is `NotFound`.
//! - Only active (`deleted=0`) to-dos of active owners are visible.
//! - `date_completed` is written whenever `done` changes.

use crate::model::todo::{validate_todo_name, Todo, TodoId, TodoPatch};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, ensure_schema_ready, parse_flag, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const TODOS_DEFAULT_LIMIT: u32 = 10;
pub const TODOS_LIMIT_MAX: u32 = 50;

const TODO_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    name,
    done,
    date_created,
    date_completed,
    deleted
FROM todos";

/// Pagination options for listing one user's to-dos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    /// Defaults to 10 and clamps to 50.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for to-do items.
pub trait TodoRepository {
    fn create_todo(&self, user_id: UserId, name: &str) -> RepoResult<Todo>;
    fn get_todo(&self, user_id: UserId, todo_id: TodoId) -> RepoResult<Option<Todo>>;
    /// Lists active to-dos, newest first.
    fn list_todos(&self, user_id: UserId, query: &TodoListQuery) -> RepoResult<Vec<Todo>>;
    fn update_todo(&self, user_id: UserId, todo_id: TodoId, patch: &TodoPatch)
        -> RepoResult<Todo>;
    fn soft_delete_todo(&self, user_id: UserId, todo_id: TodoId) -> RepoResult<()>;
}

/// SQLite-backed to-do repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, user_id: UserId, name: &str) -> RepoResult<Todo> {
        let name = name.trim();
        validate_todo_name(name)?;
        if !active_user_exists(self.conn, user_id)? {
            return Err(RepoError::not_found("user", user_id));
        }

        self.conn.execute(
            "INSERT INTO todos (user_id, name) VALUES (?1, ?2);",
            params![user_id, name],
        )?;
        let todo_id = self.conn.last_insert_rowid();
        self.get_todo(user_id, todo_id)?
            .ok_or_else(|| RepoError::InvalidData(format!("todo {todo_id} missing after insert")))
    }

    fn get_todo(&self, user_id: UserId, todo_id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE id = ?1
               AND user_id = ?2
               AND deleted = 0;"
        ))?;
        let mut rows = stmt.query(params![todo_id, user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }
        Ok(None)
    }

    fn list_todos(&self, user_id: UserId, query: &TodoListQuery) -> RepoResult<Vec<Todo>> {
        let limit = normalize_todo_limit(query.limit);
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE user_id = ?1
               AND deleted = 0
             ORDER BY date_created DESC, id DESC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![user_id, limit, query.offset])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }

    fn update_todo(
        &self,
        user_id: UserId,
        todo_id: TodoId,
        patch: &TodoPatch,
    ) -> RepoResult<Todo> {
        let current = self
            .get_todo(user_id, todo_id)?
            .ok_or(RepoError::not_found("todo", todo_id))?;

        let name = match patch.name.as_deref() {
            Some(value) => {
                let trimmed = value.trim();
                validate_todo_name(trimmed)?;
                trimmed.to_string()
            }
            None => current.name.clone(),
        };
        let done = patch.done.unwrap_or(current.done);

        // Keep the original completion time when `done` stays true.
        self.conn.execute(
            "UPDATE todos
             SET
                name = ?1,
                done = ?2,
                date_completed = CASE
                    WHEN ?2 = 0 THEN NULL
                    WHEN done = 1 THEN date_completed
                    ELSE (strftime('%s', 'now') * 1000)
                END
             WHERE id = ?3
               AND user_id = ?4
               AND deleted = 0;",
            params![name, bool_to_int(done), todo_id, user_id],
        )?;

        self.get_todo(user_id, todo_id)?
            .ok_or(RepoError::not_found("todo", todo_id))
    }

    fn soft_delete_todo(&self, user_id: UserId, todo_id: TodoId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE todos SET deleted = 1 WHERE id = ?1 AND user_id = ?2 AND deleted = 0;",
            params![todo_id, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("todo", todo_id));
        }
        Ok(())
    }
}

/// Normalizes list limit according to the to-do list contract.
pub fn normalize_todo_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => TODOS_DEFAULT_LIMIT,
        Some(value) => value.min(TODOS_LIMIT_MAX),
    }
}

fn active_user_exists(conn: &Connection, user_id: UserId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM users WHERE id = ?1 AND deleted = 0;",
            [user_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    Ok(Todo {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        done: parse_flag(row.get("done")?, "todos.done")?,
        date_created: row.get("date_created")?,
        date_completed: row.get("date_completed")?,
        deleted: parse_flag(row.get("deleted")?, "todos.deleted")?,
    })
}
