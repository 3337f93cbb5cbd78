//! Route locale extractor

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
};

use crate::response::ApiError;
use crate::state::AppState;

/// `:locale` path segment, checked against the supported locales
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path below this locale, e.g. `/en/account`
    pub fn path(&self, rest: &str) -> String {
        format!("/{}{rest}", self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        let locale = params
            .get("locale")
            .ok_or_else(|| ApiError::invalid_path("Missing locale"))?;

        let app_state = AppState::from_ref(state);
        if app_state.config().locale.is_supported(locale) {
            Ok(Self(locale.clone()))
        } else {
            Err(ApiError::UnsupportedLocale(locale.clone()))
        }
    }
}
