//! To-do use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Every call is scoped to the acting user.

use crate::model::todo::{Todo, TodoId, TodoPatch};
use crate::model::user::UserId;
use crate::repo::todo_repo::{normalize_todo_limit, TodoListQuery, TodoRepository};
use crate::repo::RepoResult;

/// Page of to-dos plus the limit actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub applied_limit: u32,
}

/// Use-case service wrapper for to-do CRUD.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_todo(&self, user_id: UserId, name: impl AsRef<str>) -> RepoResult<Todo> {
        self.repo.create_todo(user_id, name.as_ref())
    }

    pub fn get_todo(&self, user_id: UserId, todo_id: TodoId) -> RepoResult<Option<Todo>> {
        self.repo.get_todo(user_id, todo_id)
    }

    /// Lists the user's to-dos, newest first.
    pub fn list_todos(
        &self,
        user_id: UserId,
        limit: Option<u32>,
        offset: u32,
    ) -> RepoResult<TodoPage> {
        let applied_limit = normalize_todo_limit(limit);
        let query = TodoListQuery {
            limit: Some(applied_limit),
            offset,
        };
        let items = self.repo.list_todos(user_id, &query)?;
        Ok(TodoPage {
            items,
            applied_limit,
        })
    }

    /// Marks a to-do done or not done.
    pub fn set_done(&self, user_id: UserId, todo_id: TodoId, done: bool) -> RepoResult<Todo> {
        let patch = TodoPatch {
            name: None,
            done: Some(done),
        };
        self.repo.update_todo(user_id, todo_id, &patch)
    }

    pub fn update_todo(
        &self,
        user_id: UserId,
        todo_id: TodoId,
        patch: &TodoPatch,
    ) -> RepoResult<Todo> {
        self.repo.update_todo(user_id, todo_id, patch)
    }

    pub fn delete_todo(&self, user_id: UserId, todo_id: TodoId) -> RepoResult<()> {
        self.repo.soft_delete_todo(user_id, todo_id)
    }
}
