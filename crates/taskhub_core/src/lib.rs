//! Core domain logic for TaskHub.
//! This crate is the single source of truth for business invariants.

pub mod credentials;
pub mod db;
pub mod logging;
pub mod membership;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use membership::{MembershipLog, MembershipOp, MembershipOutcome, MAX_PROJECTS_PER_USER};
pub use model::project::{NewProject, Project, ProjectId, ProjectStatus};
pub use model::todo::{Todo, TodoId, TodoPatch};
pub use model::user::{NewUser, User, UserId};
pub use model::ValidationError;
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::todo_repo::{SqliteTodoRepository, TodoRepository};
pub use repo::user_repo::{SqliteUserRepository, UserListQuery, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::membership_service::{MembershipError, MembershipService};
pub use service::project_service::ProjectService;
pub use service::todo_service::{TodoPage, TodoService};
pub use service::user_service::{RegisterRequest, UserService, UserServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
