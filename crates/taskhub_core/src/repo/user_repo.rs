//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/list/soft-delete APIs over `users`.
//! - Own the soft-delete cascade to the user's to-dos.
//!
//! # Invariants
//! - Reads exclude `deleted=1` rows unless `include_deleted` is requested.
//! - Soft delete flips `users.deleted` and `todos.deleted` and releases the
//!   user's project memberships in one transaction. It is idempotent.

use crate::model::user::{NewUser, User, UserId};
use crate::repo::{
    bool_to_int, ensure_schema_ready, is_unique_violation, parse_flag, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

const USER_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    password_hash,
    is_staff,
    date_joined,
    deleted
FROM users";

/// Query options for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for user identity records.
pub trait UserRepository {
    /// Inserts one user with an already-hashed password.
    fn create_user(&self, draft: &NewUser, password_hash: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId, include_deleted: bool) -> RepoResult<Option<User>>;
    /// Looks up a user by email, case-insensitively.
    fn find_by_email(&self, email: &str, include_deleted: bool) -> RepoResult<Option<User>>;
    /// Lists users ordered by id.
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    /// Soft-deletes one user, tombstones their to-dos and drops their
    /// project memberships.
    ///
    /// Returns the number of to-dos newly marked deleted.
    fn soft_delete_user(&mut self, id: UserId) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, draft: &NewUser, password_hash: &str) -> RepoResult<User> {
        draft.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO users (
                first_name,
                last_name,
                email,
                password_hash,
                is_staff
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.email.as_str(),
                password_hash,
                bool_to_int(draft.is_staff),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => return Err(RepoError::DuplicateEmail),
            Err(err) => return Err(err.into()),
        }

        let id = self.conn.last_insert_rowid();
        self.get_user(id, false)?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} missing after insert")))
    }

    fn get_user(&self, id: UserId, include_deleted: bool) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_by_email(&self, email: &str, include_deleted: bool) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE email = ?1 COLLATE NOCASE
               AND (?2 = 1 OR deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![email.trim(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND deleted = 0");
        }
        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn soft_delete_user(&mut self, id: UserId) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute("UPDATE users SET deleted = 1 WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }

        let tombstoned = tx.execute(
            "UPDATE todos SET deleted = 1 WHERE user_id = ?1 AND deleted = 0;",
            [id],
        )?;
        tx.execute("DELETE FROM project_members WHERE user_id = ?1;", [id])?;

        tx.commit()?;
        Ok(tombstoned)
    }
}

pub(crate) fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        is_staff: parse_flag(row.get("is_staff")?, "users.is_staff")?,
        date_joined: row.get("date_joined")?,
        deleted: parse_flag(row.get("deleted")?, "users.deleted")?,
    })
}
