//! User registration, authentication and lifecycle service.
//!
//! # Responsibility
//! - Validate registration input and hash passwords before persistence.
//! - Authenticate by email/password, rejecting soft-deleted users.
//! - Soft-delete users with an explicit cascade to their to-dos.
//!
//! # Invariants
//! - Error messages for credential failures do not reveal which part failed.
//! - Log events carry ids and counts only, never emails or names.

use crate::credentials::{hash_password, verify_password, PasswordHashError};
use crate::model::user::{NewUser, User, UserId};
use crate::model::ValidationError;
use crate::repo::user_repo::{UserListQuery, UserRepository};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Service error for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    EmailRequired,
    PasswordRequired,
    PasswordMismatch,
    EmailAlreadyExists,
    InvalidCredentials,
    Validation(ValidationError),
    UserNotFound(UserId),
    PasswordHashing(PasswordHashError),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailRequired => write!(f, "The Email field must be set"),
            Self::PasswordRequired => write!(f, "The Password field must be set"),
            Self::PasswordMismatch => write!(f, "Passwords do not match."),
            Self::EmailAlreadyExists => write!(f, "Email already exists."),
            Self::InvalidCredentials => write!(f, "Invalid credentials."),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::PasswordHashing(err) => write!(f, "password hashing failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::PasswordHashing(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEmail => Self::EmailAlreadyExists,
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "user",
                id,
            } => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a regular (non-staff) user.
    pub fn register(&self, request: &RegisterRequest) -> Result<User, UserServiceError> {
        let draft = NewUser::new(
            request.first_name.as_str(),
            request.last_name.as_str(),
            request.email.as_str(),
        );
        self.create_checked(draft, &request.password, Some(&request.confirm_password))
    }

    /// Creates a staff user allowed to manage project membership.
    pub fn create_superuser(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let draft = NewUser::new(first_name, last_name, email).staff();
        self.create_checked(draft, password, None)
    }

    /// Returns the active user matching `email` and `password`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let Some(user) = self.repo.find_by_email(email, false)? else {
            return Err(UserServiceError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            warn!(
                "event=user_login module=user status=rejected user_id={}",
                user.id
            );
            return Err(UserServiceError::InvalidCredentials);
        }
        info!("event=user_login module=user status=ok user_id={}", user.id);
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id, false)
    }

    pub fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        self.repo.list_users(query)
    }

    /// Soft-deletes a user and tombstones their to-dos.
    ///
    /// Deleting an already-deleted user succeeds and tombstones nothing new.
    pub fn delete_user(&mut self, id: UserId) -> Result<usize, UserServiceError> {
        let tombstoned = self.repo.soft_delete_user(id)?;
        info!(
            "event=user_delete module=user status=ok user_id={} todos_tombstoned={}",
            id, tombstoned
        );
        Ok(tombstoned)
    }

    fn create_checked(
        &self,
        draft: NewUser,
        password: &str,
        confirm_password: Option<&str>,
    ) -> Result<User, UserServiceError> {
        if draft.email.is_empty() {
            return Err(UserServiceError::EmailRequired);
        }
        if password.is_empty() {
            return Err(UserServiceError::PasswordRequired);
        }
        if let Some(confirm) = confirm_password {
            if confirm != password {
                return Err(UserServiceError::PasswordMismatch);
            }
        }
        draft.validate().map_err(UserServiceError::Validation)?;
        if self.repo.find_by_email(&draft.email, true)?.is_some() {
            return Err(UserServiceError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password).map_err(UserServiceError::PasswordHashing)?;
        let user = self.repo.create_user(&draft, &password_hash)?;
        info!(
            "event=user_create module=user status=ok user_id={} is_staff={}",
            user.id, user.is_staff
        );
        Ok(user)
    }
}
