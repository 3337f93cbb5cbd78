//! Translation catalogue for the browser-side loader

use axum::{extract::State, Json};
use accounts_common::Catalogue;

use crate::extractors::Locale;
use crate::state::AppState;

/// GET /:locale/translations
///
/// Messages of the route locale plus the fallback locale.
pub async fn catalogue(State(state): State<AppState>, locale: Locale) -> Json<Catalogue> {
    Json(
        state
            .service_context()
            .translator()
            .catalogue()
            .for_locales(&[locale.as_str()]),
    )
}
