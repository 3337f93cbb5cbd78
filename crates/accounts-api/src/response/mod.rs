//! Response types and error handling for HTTP endpoints
//!
//! Pages render as JSON views; redirects use `303 See Other`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use accounts_cache::{SessionError, SessionUser};
use accounts_common::AppError;
use accounts_core::DomainError;
use accounts_service::ServiceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Invalid form body: {0}")]
    InvalidForm(String),

    #[error("Locale not supported: {0}")]
    UnsupportedLocale(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Domain(e) => AppError::status_code_for_domain(e),
            Self::InvalidPath(_) | Self::InvalidQuery(_) | Self::InvalidForm(_) => 400,
            Self::UnsupportedLocale(_) => 404,
            Self::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY_PARAMETER",
            Self::InvalidForm(_) => "INVALID_FORM",
            Self::UnsupportedLocale(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::Service(err.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error detail for API responses
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    /// Field errors of a rejected form, as catalogue ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        let message = if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let details = match &self {
            Self::Service(e) => e
                .form_errors()
                .and_then(|errors| serde_json::to_value(errors).ok()),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Page views
// ============================================================================

/// Flash message translated for the page locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashView {
    pub kind: String,
    pub message: String,
}

/// Envelope of every rendered page
#[derive(Debug, Serialize)]
pub struct PageView<T> {
    pub page: &'static str,
    pub locale: String,
    pub user: Option<SessionUser>,
    pub flashes: Vec<FlashView>,
    #[serde(flatten)]
    pub data: T,
}

/// Page data for views that carry nothing beyond the envelope
#[derive(Debug, Default, Serialize)]
pub struct Empty {}
