//! Route handlers
//!
//! Page handlers take the [`WebSession`], work through the services and
//! finish with [`render`] or [`redirect`], which store the session and
//! attach its cookie.

pub mod account;
pub mod admin;
pub mod health;
pub mod home;
pub mod security;
pub mod translations;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use accounts_cache::FlashKind;
use accounts_core::User;
use accounts_service::AuthService;
use serde::Serialize;

use crate::extractors::{Locale, WebSession};
use crate::response::{ApiResult, FlashView, PageView};
use crate::state::AppState;

/// Message flashed when a page needs a logged-in user
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to continue.";

/// Render a page view, consuming pending flashes
pub(crate) async fn render<T: Serialize>(
    state: &AppState,
    mut session: WebSession,
    locale: &Locale,
    page: &'static str,
    status: StatusCode,
    data: T,
) -> ApiResult<Response> {
    let translator = state.service_context().translator();
    let flashes = session
        .data
        .take_flashes()
        .into_iter()
        .map(|flash| FlashView {
            kind: flash.kind.to_string(),
            message: translator.trans(&flash.message, locale.as_str()),
        })
        .collect();
    let user = session.data.user.clone();
    let jar = session.commit(state).await?;

    let view = PageView {
        page,
        locale: locale.as_str().to_string(),
        user,
        flashes,
        data,
    };
    Ok((status, jar, Json(view)).into_response())
}

/// `303 See Other` to `to`
pub(crate) async fn redirect(state: &AppState, session: WebSession, to: &str) -> ApiResult<Response> {
    let jar = session.commit(state).await?;
    Ok((jar, Redirect::to(to)).into_response())
}

/// Current user. Anonymous visitors get the requested page remembered and a
/// login prompt flashed.
pub(crate) async fn current_user_or_prompt(
    state: &AppState,
    session: &mut WebSession,
    uri: &Uri,
) -> ApiResult<Option<User>> {
    let user = AuthService::new(state.service_context())
        .current_user(&mut session.data)
        .await?;
    if user.is_none() {
        let target = uri.path_and_query().map_or_else(|| uri.path(), |p| p.as_str());
        session.data.set_target_path(target);
        session.data.add_flash(FlashKind::Warning, LOGIN_REQUIRED_MESSAGE);
    }
    Ok(user)
}
