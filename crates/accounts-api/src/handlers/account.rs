//! Account handlers: index, register, edit and removal

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Response,
};
use accounts_cache::FlashKind;
use accounts_service::{
    AccountForm, AccountService, AuthService, RemoveAccountForm, ServiceError, UserSummary,
};
use serde::Serialize;

use super::{current_user_or_prompt, redirect, render};
use crate::extractors::{ClientIp, FormBody, Locale, WebSession};
use crate::response::ApiResult;
use crate::state::AppState;

/// Message flashed when an authenticated visitor opens the register page
pub const ALREADY_LOGGED_IN_MESSAGE: &str = "You are already logged in.";

/// Data of the account index page
#[derive(Debug, Serialize)]
pub struct AccountIndexView {
    pub account: UserSummary,
    /// Token for the removal form
    pub delete_token: String,
}

/// GET /:locale/account
pub async fn index(
    State(state): State<AppState>,
    locale: Locale,
    uri: Uri,
    mut session: WebSession,
) -> ApiResult<Response> {
    let Some(user) = current_user_or_prompt(&state, &mut session, &uri).await? else {
        return redirect(&state, session, &locale.path("/account/login")).await;
    };

    let ctx = state.service_context();
    let view = AccountIndexView {
        account: UserSummary::new(&user, ctx.zones()),
        delete_token: AccountService::new(ctx).delete_token(&mut session.data),
    };
    render(&state, session, &locale, "account/index", StatusCode::OK, view).await
}

/// GET /:locale/account/register
pub async fn register_page(
    State(state): State<AppState>,
    locale: Locale,
    mut session: WebSession,
) -> ApiResult<Response> {
    if redirect_if_logged_in(&state, &mut session).await? {
        return redirect(&state, session, &locale.path("/account")).await;
    }

    let view = AccountService::new(state.service_context()).form_page(
        &mut session.data,
        AccountForm::default(),
        None,
        locale.as_str(),
    );
    render(&state, session, &locale, "account/register", StatusCode::OK, view).await
}

/// POST /:locale/account/register
pub async fn register(
    State(state): State<AppState>,
    locale: Locale,
    ip: ClientIp,
    mut session: WebSession,
    FormBody(form): FormBody<AccountForm>,
) -> ApiResult<Response> {
    if redirect_if_logged_in(&state, &mut session).await? {
        return redirect(&state, session, &locale.path("/account")).await;
    }

    let service = AccountService::new(state.service_context());
    let echo = form.clone();
    match service.register(form, &mut session.data, ip.as_deref()).await {
        Ok(_) => redirect(&state, session, &locale.path("/account")).await,
        Err(ServiceError::Form(errors)) => {
            let view = service.form_page(&mut session.data, echo, Some(&errors), locale.as_str());
            render(
                &state,
                session,
                &locale,
                "account/register",
                StatusCode::UNPROCESSABLE_ENTITY,
                view,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /:locale/account/edit
pub async fn edit_page(
    State(state): State<AppState>,
    locale: Locale,
    uri: Uri,
    mut session: WebSession,
) -> ApiResult<Response> {
    let Some(user) = current_user_or_prompt(&state, &mut session, &uri).await? else {
        return redirect(&state, session, &locale.path("/account/login")).await;
    };

    let view = AccountService::new(state.service_context()).form_page(
        &mut session.data,
        AccountForm::from_user(&user),
        None,
        locale.as_str(),
    );
    render(&state, session, &locale, "account/edit", StatusCode::OK, view).await
}

/// POST /:locale/account/edit
pub async fn edit(
    State(state): State<AppState>,
    locale: Locale,
    uri: Uri,
    ip: ClientIp,
    mut session: WebSession,
    FormBody(form): FormBody<AccountForm>,
) -> ApiResult<Response> {
    let Some(user) = current_user_or_prompt(&state, &mut session, &uri).await? else {
        return redirect(&state, session, &locale.path("/account/login")).await;
    };

    let service = AccountService::new(state.service_context());
    let mut echo = form.clone();
    echo.username.clone_from(&user.username);
    match service.edit(user, form, &mut session.data, ip.as_deref()).await {
        Ok(_) => redirect(&state, session, &locale.path("/account")).await,
        Err(ServiceError::Form(errors)) => {
            let view = service.form_page(&mut session.data, echo, Some(&errors), locale.as_str());
            render(
                &state,
                session,
                &locale,
                "account/edit",
                StatusCode::UNPROCESSABLE_ENTITY,
                view,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /:locale/account/delete
pub async fn delete(
    State(state): State<AppState>,
    locale: Locale,
    uri: Uri,
    ip: ClientIp,
    mut session: WebSession,
    FormBody(form): FormBody<RemoveAccountForm>,
) -> ApiResult<Response> {
    let Some(user) = current_user_or_prompt(&state, &mut session, &uri).await? else {
        return redirect(&state, session, &locale.path("/account/login")).await;
    };

    AccountService::new(state.service_context())
        .remove(user, form, &mut session.data, ip.as_deref())
        .await?;
    redirect(&state, session, &locale.path("/")).await
}

/// Flash the "already logged in" notice for authenticated visitors
async fn redirect_if_logged_in(state: &AppState, session: &mut WebSession) -> ApiResult<bool> {
    let user = AuthService::new(state.service_context())
        .current_user(&mut session.data)
        .await?;
    if user.is_some() {
        session.data.add_flash(FlashKind::Info, ALREADY_LOGGED_IN_MESSAGE);
    }
    Ok(user.is_some())
}
