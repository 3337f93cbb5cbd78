//! Route definitions
//!
//! Pages live under `/:locale`; unsupported locales answer 404.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{account, admin, health, home, security, translations};
use crate::state::AppState;

/// Create the main router with all page routes (health routes are separate)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::root))
        .merge(page_routes())
        .merge(account_routes())
        .merge(admin_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Home and translations
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/:locale", get(home::index))
        .route("/:locale/", get(home::index))
        .route("/:locale/translations", get(translations::catalogue))
}

/// Account routes
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/:locale/account", get(account::index))
        .route(
            "/:locale/account/register",
            get(account::register_page).post(account::register),
        )
        .route(
            "/:locale/account/edit",
            get(account::edit_page).post(account::edit),
        )
        .route("/:locale/account/delete", post(account::delete))
        .route(
            "/:locale/account/login",
            get(security::login_page).post(security::login),
        )
        .route("/:locale/account/logout", get(security::logout))
}

/// Administration routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/:locale/admin/users", get(admin::users))
        .route("/:locale/admin/users/:id/restore", post(admin::restore))
        .route("/:locale/admin/users/:id/purge", post(admin::purge))
}
