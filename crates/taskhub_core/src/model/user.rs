//! User domain model.
//!
//! # Responsibility
//! - Define the identity record used for to-do ownership and membership.
//! - Normalize and validate registration input.
//!
//! # Invariants
//! - `email` is unique across all users, compared case-insensitively.
//! - `deleted` is the source of truth for soft-delete state; soft-deleted
//!   users are invisible to default read paths.
//! - `password_hash` never leaves core in serialized form.

use crate::model::{require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub const FIRST_NAME_MAX_CHARS: usize = 30;
pub const LAST_NAME_MAX_CHARS: usize = 150;
pub const EMAIL_MAX_CHARS: usize = 254;

/// Store-assigned user identifier.
pub type UserId = i64;

/// Persisted user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Staff users act as administrators for membership management.
    pub is_staff: bool,
    /// Unix epoch milliseconds.
    pub date_joined: i64,
    pub deleted: bool,
}

impl User {
    /// Returns `"<first> <last>"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns whether this user is visible to default read paths.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

/// Validated input for inserting one user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
}

impl NewUser {
    /// Builds a draft with trimmed names and a normalized email.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl AsRef<str>,
    ) -> Self {
        Self {
            first_name: first_name.into().trim().to_string(),
            last_name: last_name.into().trim().to_string(),
            email: normalize_email(email.as_ref()),
            is_staff: false,
        }
    }

    /// Marks the draft as staff.
    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Validates field lengths and email shape.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("first_name", &self.first_name, FIRST_NAME_MAX_CHARS)?;
        require_text("last_name", &self.last_name, LAST_NAME_MAX_CHARS)?;
        require_text("email", &self.email, EMAIL_MAX_CHARS)?;
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Trims the address and lowercases its domain part.
///
/// The local part keeps its case; uniqueness is still enforced
/// case-insensitively by storage.
pub fn normalize_email(email: &str) -> String {
    let trimmed = email.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}
