//! Home page handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{Redirect, Response},
};
use accounts_service::AuthService;

use super::render;
use crate::extractors::{Locale, WebSession};
use crate::response::{ApiResult, Empty};
use crate::state::AppState;

/// GET /
pub async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("/{}/", state.default_locale()))
}

/// GET /:locale/
pub async fn index(
    State(state): State<AppState>,
    locale: Locale,
    mut session: WebSession,
) -> ApiResult<Response> {
    AuthService::new(state.service_context())
        .current_user(&mut session.data)
        .await?;
    render(&state, session, &locale, "home", StatusCode::OK, Empty::default()).await
}
