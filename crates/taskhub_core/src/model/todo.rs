//! To-do domain model.
//!
//! # Invariants
//! - `date_completed` is `Some` exactly when `done` is true.
//! - `deleted` marks a tombstone; it is set when the owner is soft-deleted.

use crate::model::user::UserId;
use crate::model::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

pub const TODO_NAME_MAX_CHARS: usize = 1000;

/// Store-assigned to-do identifier.
pub type TodoId = i64;

/// Persisted to-do item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub user_id: UserId,
    pub name: String,
    pub done: bool,
    /// Unix epoch milliseconds.
    pub date_created: i64,
    /// Unix epoch milliseconds, set when `done` flips to true.
    pub date_completed: Option<i64>,
    pub deleted: bool,
}

impl Todo {
    /// User-facing status label.
    pub fn status_label(&self) -> &'static str {
        status_label(self.done)
    }
}

/// `"Done"` or `"To Do"`.
pub fn status_label(done: bool) -> &'static str {
    if done {
        "Done"
    } else {
        "To Do"
    }
}

/// Partial update for one to-do. `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub name: Option<String>,
    pub done: Option<bool>,
}

/// Validates a to-do name.
pub fn validate_todo_name(name: &str) -> Result<(), ValidationError> {
    require_text("name", name, TODO_NAME_MAX_CHARS)
}
