//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{EntityId, EntityIdParseError};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(EntityId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Value too long for {field}: max {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    // =========================================================================
    // Programming Errors
    // =========================================================================
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid entity id: {0}")]
    InvalidEntityId(#[from] EntityIdParseError),

    #[error("More than one result was found for a single-result query")]
    NonUniqueResult,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Username already in use")]
    UsernameAlreadyExists,

    #[error("Email already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::TooLong { .. } => "VALUE_TOO_LONG",
            Self::InvalidTimeZone(_) => "INVALID_TIME_ZONE",

            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::InvalidEntityId(_) => "INVALID_ENTITY_ID",
            Self::NonUniqueResult => "NON_UNIQUE_RESULT",

            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::TooLong { .. } | Self::InvalidTimeZone(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UsernameAlreadyExists | Self::EmailAlreadyExists)
    }

    /// Invalid internal state raised by calling code, never by user input
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery(_) | Self::InvalidEntityId(_) | Self::NonUniqueResult
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::UserNotFound(EntityId::generate());
        assert_eq!(err.code(), "UNKNOWN_USER");

        let err = DomainError::InvalidQuery("Order \"x\" invalid.".to_string());
        assert_eq!(err.code(), "INVALID_QUERY");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::UserNotFound(EntityId::generate()).is_not_found());
        assert!(!DomainError::EmailAlreadyExists.is_not_found());
        assert!(DomainError::EmailAlreadyExists.is_conflict());
        assert!(DomainError::NonUniqueResult.is_programming_error());
        assert!(DomainError::TooLong { field: "username", max: 200 }.is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::TooLong {
            field: "deleter_comment",
            max: 200,
        };
        assert_eq!(
            err.to_string(),
            "Value too long for deleter_comment: max 200 characters"
        );
    }
}
