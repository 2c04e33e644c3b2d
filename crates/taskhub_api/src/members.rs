//! Project membership endpoints.
//!
//! `POST /projects/{project_id}/members/add` and `.../remove`, both taking
//! `{"user_ids": [...]}` and answering `{"logs": {"<user_id>": message}}`.
//!
//! # Invariants
//! - Authorization and body validation run before any storage access.
//! - Per-user outcomes always come back as a 200 body.

use log::warn;
use rusqlite::Connection;
use serde_json::{Map, Value};
use taskhub_core::{
    MembershipError, MembershipLog, MembershipOp, MembershipService, ProjectId, UserId,
};

use crate::response::{
    ApiResponse, STATUS_BAD_REQUEST, STATUS_FORBIDDEN, STATUS_INTERNAL_ERROR, STATUS_NOT_FOUND,
};

pub const USER_IDS_EMPTY: &str = "user_ids cannot be empty";
pub const USER_IDS_TYPE_ERROR: &str = "user_ids must contain integers";
pub const FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const PROJECT_NOT_FOUND: &str = "Project not found.";
pub const RETRY_LATER: &str = "Membership update conflicted with another request; retry later.";

/// Authenticated identity of the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_staff: bool,
}

/// Handles `POST /projects/{project_id}/members/add`.
pub fn add_members(
    conn: &mut Connection,
    caller: &Caller,
    project_id: ProjectId,
    body: &Value,
) -> ApiResponse {
    handle(conn, caller, MembershipOp::Add, project_id, body)
}

/// Handles `POST /projects/{project_id}/members/remove`.
pub fn remove_members(
    conn: &mut Connection,
    caller: &Caller,
    project_id: ProjectId,
    body: &Value,
) -> ApiResponse {
    handle(conn, caller, MembershipOp::Remove, project_id, body)
}

fn handle(
    conn: &mut Connection,
    caller: &Caller,
    op: MembershipOp,
    project_id: ProjectId,
    body: &Value,
) -> ApiResponse {
    if !caller.is_staff {
        warn!(
            "event=membership_request module=api status=forbidden op={} project_id={} caller_id={}",
            op, project_id, caller.user_id
        );
        return ApiResponse::error(STATUS_FORBIDDEN, FORBIDDEN);
    }

    let user_ids = match parse_user_ids(body) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    let mut service = MembershipService::new(conn);
    let result = match op {
        MembershipOp::Add => service.add_members(project_id, &user_ids),
        MembershipOp::Remove => service.remove_members(project_id, &user_ids),
    };

    match result {
        Ok(log) => ApiResponse::ok(logs_body(&log)),
        Err(err) => error_response(&err),
    }
}

/// Extracts `user_ids` from a request body.
///
/// Accepts JSON integers, whole-number floats such as `2.0`, and strings
/// holding a base-10 integer.
pub fn parse_user_ids(body: &Value) -> Result<Vec<UserId>, ApiResponse> {
    let raw = match body.get("user_ids") {
        None | Some(Value::Null) => {
            return Err(ApiResponse::error(STATUS_BAD_REQUEST, USER_IDS_EMPTY));
        }
        Some(Value::Array(items)) if items.is_empty() => {
            return Err(ApiResponse::error(STATUS_BAD_REQUEST, USER_IDS_EMPTY));
        }
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiResponse::error(STATUS_BAD_REQUEST, USER_IDS_TYPE_ERROR)),
    };

    raw.iter()
        .map(user_id_from_value)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ApiResponse::error(STATUS_BAD_REQUEST, USER_IDS_TYPE_ERROR))
}

fn user_id_from_value(value: &Value) -> Option<UserId> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| whole_float(number.as_f64()?)),
        Value::String(text) => text.trim().parse::<UserId>().ok(),
        _ => None,
    }
}

fn whole_float(value: f64) -> Option<UserId> {
    let in_range = value >= UserId::MIN as f64 && value < UserId::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as UserId)
}

/// Renders a decided batch as `{"logs": {"<id>": message}}`.
///
/// Keys keep the batch's first-request order.
pub fn logs_body(log: &MembershipLog) -> Value {
    let logs = log
        .iter()
        .map(|(user_id, outcome)| (user_id.to_string(), Value::from(outcome.message())))
        .collect::<Map<_, _>>();
    let mut body = Map::new();
    body.insert("logs".to_string(), Value::Object(logs));
    Value::Object(body)
}

fn error_response(err: &MembershipError) -> ApiResponse {
    match err {
        MembershipError::EmptyRequest => ApiResponse::error(STATUS_BAD_REQUEST, USER_IDS_EMPTY),
        MembershipError::ProjectNotFound(_) => {
            ApiResponse::error(STATUS_NOT_FOUND, PROJECT_NOT_FOUND)
        }
        MembershipError::Conflict(_) => ApiResponse::error(STATUS_INTERNAL_ERROR, RETRY_LATER),
        MembershipError::Repo(inner) => {
            ApiResponse::error(STATUS_INTERNAL_ERROR, format!("storage failure: {inner}"))
        }
    }
}
