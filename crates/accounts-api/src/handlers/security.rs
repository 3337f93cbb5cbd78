//! Login and logout handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
};
use accounts_cache::FlashKind;
use accounts_service::{AuthService, LoginForm, ServiceError};
use tracing::debug;

use super::{redirect, render};
use crate::extractors::{ClientIp, FormBody, Locale, WebSession};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /:locale/account/login
pub async fn login_page(
    State(state): State<AppState>,
    locale: Locale,
    mut session: WebSession,
) -> ApiResult<Response> {
    let auth = AuthService::new(state.service_context());
    if auth.current_user(&mut session.data).await?.is_some() {
        return redirect(&state, session, &locale.path("/account")).await;
    }

    let mut view = auth.login_page(&mut session.data);
    let translator = state.service_context().translator();
    view.error = view.error.map(|id| translator.trans(&id, locale.as_str()));
    render(&state, session, &locale, "account/login", StatusCode::OK, view).await
}

/// POST /:locale/account/login
pub async fn login(
    State(state): State<AppState>,
    locale: Locale,
    ip: ClientIp,
    mut session: WebSession,
    FormBody(form): FormBody<LoginForm>,
) -> ApiResult<Response> {
    let auth = AuthService::new(state.service_context());
    if auth.current_user(&mut session.data).await?.is_some() {
        return redirect(&state, session, &locale.path("/account")).await;
    }

    match auth.authenticate(form, &mut session.data, ip.as_deref()).await {
        Ok(outcome) => {
            let target = outcome
                .target_path
                .unwrap_or_else(|| locale.path("/account"));
            redirect(&state, session, &target).await
        }
        Err(ServiceError::App(e)) if e.is_authentication_failure() => {
            debug!("Login rejected, back to the form");
            redirect(&state, session, &locale.path("/account/login")).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /:locale/account/logout
pub async fn logout(
    State(state): State<AppState>,
    locale: Locale,
    mut session: WebSession,
) -> ApiResult<Response> {
    let auth = AuthService::new(state.service_context());
    if auth.current_user(&mut session.data).await?.is_none() {
        session.data.add_flash(FlashKind::Info, "You are not logged in.");
        return redirect(&state, session, &locale.path("/account/login")).await;
    }

    auth.logout(&mut session.data);
    redirect(&state, session, &locale.path("/")).await
}
