//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use accounts_cache::SessionError;
use accounts_common::AppError;
use accounts_core::DomainError;
use std::fmt;

use crate::dto::FormErrors;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Application error (auth, validation, etc.)
    App(AppError),

    /// Submitted form has field errors; re-render it
    Form(FormErrors),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Session backend failure
    Session(SessionError),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Form(errors) => write!(f, "Invalid form: {} field(s) rejected", errors.len()),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Session(e) => write!(f, "Session error: {e}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            Self::Session(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => AppError::status_code_for_domain(e),
            Self::App(e) => e.status_code(),
            Self::Form(_) => 422,
            Self::NotFound { .. } => 404,
            Self::Session(_) | Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Form(_) => "FORM_INVALID",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Session(_) => "SESSION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Field errors, when the form was rejected
    pub fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            Self::Form(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<SessionError> for ServiceError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<FormErrors> for ServiceError {
    fn from(errors: FormErrors) -> Self {
        Self::Form(errors)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Form(errors) => AppError::Validation(errors.to_string()),
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Session(e) => AppError::Cache(e.to_string()),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
