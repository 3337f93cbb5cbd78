//! Application error types
//!
//! Unified error handling shared by the service and HTTP layers.

use accounts_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Message shown for every failed credential check
pub const BAD_CREDENTIALS: &str = "Bad credentials.";

/// Message shown when the login form token does not match
pub const INVALID_CSRF_TOKEN: &str = "Invalid CSRF token.";

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Bad credentials.")]
    BadCredentials,

    #[error("Invalid CSRF token.")]
    InvalidCsrfToken,

    #[error("Please login to continue.")]
    LoginRequired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Password handling
    #[error("Password encoding failed: {0}")]
    PasswordEncoding(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Infrastructure
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => 400,

            Self::BadCredentials | Self::LoginRequired => 401,

            Self::InvalidCsrfToken | Self::InsufficientPermissions => 403,

            Self::NotFound(_) => 404,

            Self::AlreadyExists(_) => 409,

            Self::RateLimitExceeded => 429,

            Self::PasswordEncoding(_)
            | Self::Database(_)
            | Self::Cache(_)
            | Self::Internal(_)
            | Self::Config(_) => 500,

            Self::Domain(e) => Self::status_code_for_domain(e),
        }
    }

    /// Status of a domain error; programming errors are server errors
    #[must_use]
    pub fn status_code_for_domain(e: &DomainError) -> u16 {
        if e.is_programming_error() {
            500
        } else if e.is_not_found() {
            404
        } else if e.is_validation() {
            400
        } else if e.is_conflict() {
            409
        } else {
            500
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadCredentials => "BAD_CREDENTIALS",
            Self::InvalidCsrfToken => "INVALID_CSRF_TOKEN",
            Self::LoginRequired => "LOGIN_REQUIRED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::PasswordEncoding(_) => "PASSWORD_ENCODING_FAILED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Failure of the login flow (credentials or CSRF)
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::BadCredentials | Self::InvalidCsrfToken)
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Error response structure for API responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        // Server-side failures never leak their cause
        let message = if err.is_server_error() {
            "Internal server error".to_string()
        } else {
            err.to_string()
        };
        Self {
            code: err.error_code().to_string(),
            message,
            details: None,
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
