//! Error handling utilities for repositories

use accounts_core::{DomainError, EntityId};
use sqlx::Error as SqlxError;

/// Unique constraint on `users.username`
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Unique constraint on `users.email`
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Map a unique violation to the error of the violated constraint
pub fn map_unique_violation(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => DomainError::UsernameAlreadyExists,
                Some(EMAIL_CONSTRAINT) => DomainError::EmailAlreadyExists,
                _ => DomainError::DatabaseError(db_err.message().to_string()),
            };
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "user not found" error
pub fn user_not_found(id: EntityId) -> DomainError {
    DomainError::UserNotFound(id)
}
