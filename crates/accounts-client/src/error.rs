//! Client error types

use accounts_common::TranslatorError;
use thiserror::Error;

use crate::ajax::AjaxMethod;

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required option is missing (`"<what> not specified."`)
    #[error("{0} not specified.")]
    NotSpecified(&'static str),

    #[error("String invalid.")]
    InvalidString(String),

    #[error("Payload unacceptable for {0} method.")]
    PayloadUnacceptable(AjaxMethod),

    #[error("{0}")]
    Transport(String),

    /// Non-2xx answer, message already resolved for display
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    InvalidResponse(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Translations(#[from] TranslatorError),
}

impl ClientError {
    /// Stable code for logs
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotSpecified(_) => "NOT_SPECIFIED",
            Self::InvalidString(_) => "STRING_INVALID",
            Self::PayloadUnacceptable(_) => "PAYLOAD_UNACCEPTABLE",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::InvalidKey(_) => "INVALID_STORAGE_KEY",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Translations(_) => "INVALID_TRANSLATIONS",
        }
    }

    /// Misuse of the API rather than a runtime failure
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::NotSpecified(_) | Self::InvalidString(_) | Self::PayloadUnacceptable(_)
        )
    }

    /// The request could not complete or the server answered with garbage
    #[must_use]
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Http { .. } | Self::InvalidResponse(_) | Self::Translations(_)
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ClientError::NotSpecified("Translations URL").to_string(),
            "Translations URL not specified."
        );
        assert_eq!(ClientError::InvalidString("GOT".into()).to_string(), "String invalid.");
        assert_eq!(
            ClientError::PayloadUnacceptable(AjaxMethod::Head).to_string(),
            "Payload unacceptable for HEAD method."
        );
    }

    #[test]
    fn test_classification() {
        assert!(ClientError::NotSpecified("URL").is_programming_error());
        assert!(!ClientError::NotSpecified("URL").is_network_failure());

        let http = ClientError::Http {
            status: 502,
            message: "Code 502 error.".into(),
        };
        assert!(http.is_network_failure());
        assert_eq!(http.code(), "HTTP_ERROR");
        assert_eq!(http.to_string(), "Code 502 error.");
    }
}
