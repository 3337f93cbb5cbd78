//! Cookie-bound session extractor
//!
//! Loads [`SessionData`] for the id carried by the session cookie. Handlers
//! mutate it and hand it back through [`WebSession::commit`], which stores
//! the data and returns the cookie jar to attach to the response.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use accounts_cache::{generate_session_id, SessionData};
use tracing::debug;

use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Session of the current visitor
#[derive(Debug)]
pub struct WebSession {
    id: Option<String>,
    jar: CookieJar,
    pub data: SessionData,
}

impl WebSession {
    /// Id of a stored session, `None` for a fresh visitor
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Persist the data and produce the cookie to send back.
    ///
    /// A login or logout moves the data to a new id. Sessions holding nothing
    /// are not stored.
    pub async fn commit(mut self, state: &AppState) -> ApiResult<CookieJar> {
        let store = state.service_context().session_store();
        let settings = &state.config().session;

        let id = if self.data.take_rotation() {
            let id = store.rotate(self.id.as_deref(), &self.data).await?;
            debug!("Session id rotated");
            id
        } else if let Some(id) = self.id.take() {
            store.save(&id, &self.data).await?;
            id
        } else if self.data.is_empty() {
            return Ok(self.jar);
        } else {
            let id = generate_session_id();
            store.save(&id, &self.data).await?;
            id
        };

        let cookie = Cookie::build((settings.cookie_name.clone(), id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(settings.secure);
        Ok(self.jar.add(cookie))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for WebSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_name = &app_state.config().session.cookie_name;

        let Some(id) = jar.get(cookie_name).map(|c| c.value().to_string()) else {
            return Ok(Self {
                id: None,
                jar,
                data: SessionData::new(),
            });
        };

        let stored = app_state
            .service_context()
            .session_store()
            .load(&id)
            .await?;

        // Unknown ids are never adopted
        Ok(match stored {
            Some(data) => Self {
                id: Some(id),
                jar,
                data,
            },
            None => Self {
                id: None,
                jar,
                data: SessionData::new(),
            },
        })
    }
}
