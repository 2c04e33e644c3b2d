//! JSON request/response boundary for TaskHub.
//!
//! # Responsibility
//! - Map HTTP-shaped requests onto core services.
//! - Own the status-code mapping of core errors.
//! - Resolve process configuration from the environment.
//!
//! Transport is out of scope: handlers take a connection plus a parsed
//! JSON body and return an [`ApiResponse`].

pub mod config;
pub mod members;
pub mod reports;
pub mod response;

pub use config::TaskhubConfig;
pub use members::{add_members, remove_members, Caller};
pub use response::ApiResponse;
