//! Read-only report endpoints.

use log::error;
use rusqlite::Connection;
use taskhub_core::report;
use taskhub_core::RepoError;

use crate::response::{ApiResponse, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR};

/// `GET /projects/details`
pub fn project_details(conn: &Connection) -> ApiResponse {
    respond("project_details", report::project_details(conn))
}

/// `GET /users/todo-stats`
pub fn user_todo_stats(conn: &Connection) -> ApiResponse {
    respond("user_todo_stats", report::user_todo_stats(conn))
}

/// `GET /users/top-pending?limit=N`
pub fn top_pending_users(conn: &Connection, limit: Option<u32>) -> ApiResponse {
    respond("top_pending_users", report::top_pending_users(conn, limit))
}

/// `GET /todos/completed?start=..&end=..` with inclusive epoch-ms bounds.
pub fn completed_todos_between(conn: &Connection, start_ms: i64, end_ms: i64) -> ApiResponse {
    if start_ms > end_ms {
        return ApiResponse::error(STATUS_BAD_REQUEST, "start must not be after end");
    }
    respond(
        "completed_todos",
        report::completed_todos_between(conn, start_ms, end_ms),
    )
}

/// `GET /todos/with-users`
pub fn todos_with_creator(conn: &Connection) -> ApiResponse {
    respond("todos_with_creator", report::todos_with_creator(conn))
}

/// `GET /users/pending/{n}`
pub fn users_with_pending_count(conn: &Connection, pending: u32) -> ApiResponse {
    respond(
        "users_with_pending_count",
        report::users_with_pending_count(conn, pending),
    )
}

/// `GET /projects/member-name-edge/{letter}`
pub fn projects_with_member_name_edge(conn: &Connection, letter: char) -> ApiResponse {
    if !letter.is_ascii_alphabetic() {
        return ApiResponse::error(STATUS_BAD_REQUEST, "letter must be an ASCII letter");
    }
    respond(
        "projects_with_member_name_edge",
        report::projects_with_member_name_edge(conn, letter),
    )
}

/// `GET /projects/report`
pub fn project_wise_report(conn: &Connection) -> ApiResponse {
    respond("project_wise_report", report::project_wise_report(conn))
}

/// `GET /users/project-status`
pub fn user_wise_project_status(conn: &Connection) -> ApiResponse {
    respond(
        "user_wise_project_status",
        report::user_wise_project_status(conn),
    )
}

fn respond<T: serde::Serialize>(name: &str, result: Result<T, RepoError>) -> ApiResponse {
    match result {
        Ok(rows) => ApiResponse::ok_json(&rows),
        Err(err) => {
            error!(
                "event=report_query module=api status=error report={} error={}",
                name, err
            );
            ApiResponse::error(STATUS_INTERNAL_ERROR, format!("report failed: {err}"))
        }
    }
}
