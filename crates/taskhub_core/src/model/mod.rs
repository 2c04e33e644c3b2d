//! Domain model for users, to-dos and projects.
//!
//! # Responsibility
//! - Define canonical records used by core business logic.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - Users and to-dos are soft-deleted via an explicit `deleted` flag.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod project;
pub mod todo;
pub mod user;

/// Field-level validation failure for domain drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    Blank(&'static str),
    /// Text field exceeds its maximum character length.
    TooLong { field: &'static str, max_chars: usize },
    /// Email does not look like `local@domain.tld`.
    InvalidEmail,
    /// Numeric field must be strictly positive.
    NotPositive(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::NotPositive(field) => write!(f, "{field} must be a positive integer"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_text, ValidationError};

    #[test]
    fn require_text_rejects_whitespace_only() {
        assert_eq!(
            require_text("name", "   ", 10),
            Err(ValidationError::Blank("name"))
        );
    }

    #[test]
    fn require_text_counts_chars_not_bytes() {
        assert!(require_text("name", "ééééé", 5).is_ok());
        assert_eq!(
            require_text("name", "éééééé", 5),
            Err(ValidationError::TooLong {
                field: "name",
                max_chars: 5
            })
        );
    }
}
