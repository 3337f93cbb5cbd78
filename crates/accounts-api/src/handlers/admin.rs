//! Account administration handlers

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Response,
};
use accounts_service::{AccountService, TokenForm, UserSummary};
use serde::Serialize;

use super::{current_user_or_prompt, redirect, render};
use crate::extractors::{FormBody, ListQuery, Locale, UserIdPath, WebSession};
use crate::response::ApiResult;
use crate::state::AppState;

/// Data of the admin user list
#[derive(Debug, Serialize)]
pub struct UserListView {
    pub users: Vec<UserSummary>,
    pub include_deleted: &'static str,
    /// Token for the restore and purge forms
    pub csrf_token: String,
}

/// GET /:locale/admin/users
pub async fn users(
    State(state): State<AppState>,
    locale: Locale,
    uri: Uri,
    query: ListQuery,
    mut session: WebSession,
) -> ApiResult<Response> {
    let Some(actor) = current_user_or_prompt(&state, &mut session, &uri).await? else {
        return redirect(&state, session, &locale.path("/account/login")).await;
    };

    let service = AccountService::new(state.service_context());
    let users = service.list(&actor, query.include, &query.order_by).await?;
    let view = UserListView {
        users,
        include_deleted: query.include.as_str(),
        csrf_token: service.admin_token(&mut session.data),
    };
    render(&state, session, &locale, "admin/users", StatusCode::OK, view).await
}

/// POST /:locale/admin/users/:id/restore
pub async fn restore(
    State(state): State<AppState>,
    locale: Locale,
    uri: Uri,
    UserIdPath(id): UserIdPath,
    mut session: WebSession,
    FormBody(form): FormBody<TokenForm>,
) -> ApiResult<Response> {
    let Some(actor) = current_user_or_prompt(&state, &mut session, &uri).await? else {
        return redirect(&state, session, &locale.path("/account/login")).await;
    };

    AccountService::new(state.service_context())
        .restore(&actor, id, &form.token, &mut session.data)
        .await?;
    redirect(&state, session, &locale.path("/admin/users?include_deleted=yes")).await
}

/// POST /:locale/admin/users/:id/purge
pub async fn purge(
    State(state): State<AppState>,
    locale: Locale,
    uri: Uri,
    UserIdPath(id): UserIdPath,
    mut session: WebSession,
    FormBody(form): FormBody<TokenForm>,
) -> ApiResult<Response> {
    let Some(actor) = current_user_or_prompt(&state, &mut session, &uri).await? else {
        return redirect(&state, session, &locale.path("/account/login")).await;
    };

    AccountService::new(state.service_context())
        .purge(&actor, id, &form.token, &mut session.data)
        .await?;
    redirect(&state, session, &locale.path("/admin/users?include_deleted=yes")).await
}
