//! Authentication service
//!
//! Handles the login form, credential checks, the current user and logout.
//! Every failed attempt stores one generic message in the session, whichever
//! check rejected it.

use accounts_cache::{SessionData, SessionUser};
use accounts_common::{AppError, AUTHENTICATE_INTENTION};
use accounts_core::{IncludeDeleted, User};
use tracing::{info, instrument, warn};

use crate::dto::{AuthOutcome, LoginForm, LoginView};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Last username, the previous error (consumed) and a CSRF token
    pub fn login_page(&self, session: &mut SessionData) -> LoginView {
        LoginView {
            last_username: session.last_username.clone(),
            error: session.take_last_error(),
            csrf_token: self.ctx.csrf().token(session, AUTHENTICATE_INTENTION),
        }
    }

    /// Check the submitted credentials and log the user in
    #[instrument(skip(self, form, session), fields(username = %form.username))]
    pub async fn authenticate(
        &self,
        form: LoginForm,
        session: &mut SessionData,
        ip: Option<&str>,
    ) -> ServiceResult<AuthOutcome> {
        session.last_username = Some(form.username.clone());

        match self.check_credentials(&form, session).await {
            Ok(mut user) => {
                self.login(&mut user, session).await?;
                info!(ip_address = ip.unwrap_or("-"), user = %user.username, "User logged in.");
                Ok(AuthOutcome {
                    user,
                    target_path: session.take_target_path(),
                })
            }
            Err(ServiceError::App(err)) if err.is_authentication_failure() => {
                warn!(ip_address = ip.unwrap_or("-"), reason = %err, "Authentication failed.");
                session.set_last_error(err.to_string());
                Err(err.into())
            }
            Err(err) => Err(err),
        }
    }

    async fn check_credentials(&self, form: &LoginForm, session: &SessionData) -> ServiceResult<User> {
        self.ctx
            .verify_csrf(session, AUTHENTICATE_INTENTION, &form.csrf_token)?;

        let user = self
            .ctx
            .user_repo()
            .load_by_identifier(form.username.trim())
            .await?;

        // Unknown identifiers pay for a verification too
        let hash = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let verified = self.ctx.passwords().verify(&form.password, hash);

        match user {
            Some(user) if verified => Ok(user),
            _ => Err(AppError::BadCredentials.into()),
        }
    }

    /// Stamp the visit, persist it and store the user in a fresh session
    pub async fn login(&self, user: &mut User, session: &mut SessionData) -> ServiceResult<()> {
        user.touch_last_seen();
        self.ctx.user_repo().update(user).await?;
        session.login(SessionUser::from(&*user));
        Ok(())
    }

    /// Reload the session's user.
    ///
    /// The session is logged out when the user disappeared, was removed or
    /// changed username or roles since logging in.
    #[instrument(skip(self, session))]
    pub async fn current_user(&self, session: &mut SessionData) -> ServiceResult<Option<User>> {
        let Some(snapshot) = session.user.clone() else {
            return Ok(None);
        };

        let user = self
            .ctx
            .user_repo()
            .find_by_id(snapshot.id, IncludeDeleted::No)
            .await?;

        match user {
            Some(user) if snapshot.matches(&user) => Ok(Some(user)),
            _ => {
                info!(user = %snapshot.username, "Session user changed, logging out.");
                session.logout();
                Ok(None)
            }
        }
    }

    /// Current user, or `LoginRequired`
    pub async fn require_user(&self, session: &mut SessionData) -> ServiceResult<User> {
        self.current_user(session)
            .await?
            .ok_or_else(|| AppError::LoginRequired.into())
    }

    /// Forget the session's user
    pub fn logout(&self, session: &mut SessionData) {
        if let Some(user) = &session.user {
            info!(user = %user.username, "User logged out.");
        }
        session.logout();
    }
}
