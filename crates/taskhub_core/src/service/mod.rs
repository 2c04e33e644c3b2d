//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the HTTP/CLI layers decoupled from storage details.

pub mod membership_service;
pub mod project_service;
pub mod todo_service;
pub mod user_service;
