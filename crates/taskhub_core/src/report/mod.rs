//! Read-only reporting projections.
//!
//! # Responsibility
//! - Expose aggregate views over projects, users and to-dos.
//! - Keep report row shaping inside core.
//!
//! # Invariants
//! - Reports never write.
//! - Soft-deleted users and to-dos are excluded from every projection.

pub mod projections;
pub mod rollups;

pub use projections::{
    completed_todos_between, project_details, todos_with_creator, top_pending_users,
    user_todo_stats, users_with_pending_count, CompletedTodoRow, ProjectDetailsRow, TodoCreator,
    TodoWithCreatorRow, UserTodoStatsRow, TOP_PENDING_DEFAULT_LIMIT,
};
pub use rollups::{
    project_wise_report, projects_with_member_name_edge, user_wise_project_status,
    MemberTodoStatsRow, ProjectNameRow, ProjectReportRow, UserProjectsRow,
};
