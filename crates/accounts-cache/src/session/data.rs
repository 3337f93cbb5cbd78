//! Per-visitor session state.
//!
//! Everything the web flow remembers between requests: the authenticated
//! user snapshot, CSRF tokens per intention, the last login attempt, the
//! page to return to after login and pending flash messages.

use std::collections::HashMap;
use std::fmt;

use accounts_common::CsrfTokenStorage;
use accounts_core::{EntityId, User};
use serde::{Deserialize, Serialize};

/// Snapshot of the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: EntityId,
    pub username: String,
    pub roles: Vec<String>,
}

impl SessionUser {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// The stored user still has the identity this snapshot was taken from
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        user.audit.id == self.id
            && user.matches_identity(&self.username, self.roles.iter().map(String::as_str))
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.audit.id,
            username: user.username.clone(),
            roles: user.roles(),
        }
    }
}

/// Flash message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for FlashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message shown once on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    /// Catalogue id or literal text
    pub message: String,
}

/// Session payload stored under the session id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    csrf_tokens: HashMap<String, String>,
    #[serde(default)]
    pub last_username: Option<String>,
    #[serde(default)]
    last_error: Option<String>,
    #[serde(default)]
    target_path: Option<String>,
    #[serde(default)]
    flashes: Vec<Flash>,
    /// Set on login; the id is replaced before the session is saved
    #[serde(skip)]
    rotate_id: bool,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Store the authenticated user and request a fresh session id
    pub fn login(&mut self, user: SessionUser) {
        self.user = Some(user);
        self.last_error = None;
        self.rotate_id = true;
    }

    /// Forget everything, keeping pending flashes
    pub fn logout(&mut self) {
        let flashes = std::mem::take(&mut self.flashes);
        *self = Self {
            flashes,
            rotate_id: true,
            ..Self::default()
        };
    }

    /// Whether the id must be replaced; clears the request
    pub fn take_rotation(&mut self) -> bool {
        std::mem::take(&mut self.rotate_id)
    }

    pub fn set_last_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn set_target_path(&mut self, path: impl Into<String>) {
        self.target_path = Some(path.into());
    }

    pub fn take_target_path(&mut self) -> Option<String> {
        self.target_path.take()
    }

    pub fn add_flash(&mut self, kind: FlashKind, message: impl Into<String>) {
        self.flashes.push(Flash {
            kind,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    /// Nothing worth persisting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user.is_none()
            && self.csrf_tokens.is_empty()
            && self.last_username.is_none()
            && self.last_error.is_none()
            && self.target_path.is_none()
            && self.flashes.is_empty()
    }
}

impl CsrfTokenStorage for SessionData {
    fn csrf_token(&self, intention: &str) -> Option<&str> {
        self.csrf_tokens.get(intention).map(String::as_str)
    }

    fn set_csrf_token(&mut self, intention: &str, token: String) {
        self.csrf_tokens.insert(intention.to_string(), token);
    }

    fn remove_csrf_token(&mut self, intention: &str) -> Option<String> {
        self.csrf_tokens.remove(intention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounts_common::{CsrfTokenManager, AUTHENTICATE_INTENTION};
    use accounts_core::ROLE_ADMIN;

    #[test]
    fn test_login_requests_rotation() {
        let user = User::new("jdoe", None);
        let mut session = SessionData::new();
        session.set_last_error("Bad credentials.");
        session.login(SessionUser::from(&user));

        assert!(session.is_authenticated());
        assert!(session.take_last_error().is_none());
        assert!(session.take_rotation());
        assert!(!session.take_rotation());
    }

    #[test]
    fn test_logout_keeps_flashes() {
        let mut session = SessionData::new();
        session.login(SessionUser::from(&User::new("jdoe", None)));
        session.last_username = Some("jdoe".to_string());
        session.add_flash(FlashKind::Info, "bye");
        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.last_username.is_none());
        assert_eq!(session.take_flashes().len(), 1);
        assert!(session.take_flashes().is_empty());
    }

    #[test]
    fn test_session_user_matches() {
        let mut user = User::new("jdoe", None);
        let snapshot = SessionUser::from(&user);
        assert!(snapshot.matches(&user));

        user.add_role(ROLE_ADMIN).unwrap();
        assert!(!snapshot.matches(&user));
        assert!(SessionUser::from(&user).has_role(ROLE_ADMIN));

        let other = User::new("jdoe", None);
        assert!(!snapshot.matches(&other));
    }

    #[test]
    fn test_csrf_storage_survives_serialization() {
        let manager = CsrfTokenManager::new();
        let mut session = SessionData::new();
        let token = manager.token(&mut session, AUTHENTICATE_INTENTION);

        let json = serde_json::to_string(&session).unwrap();
        let restored: SessionData = serde_json::from_str(&json).unwrap();
        assert!(manager.is_valid(&restored, AUTHENTICATE_INTENTION, &token));
        assert!(!restored.is_empty());
    }

    #[test]
    fn test_is_empty_ignores_rotation_flag() {
        let mut session = SessionData::new();
        assert!(session.is_empty());
        session.logout();
        assert!(session.is_empty());
        session.set_target_path("/en/account");
        assert!(!session.is_empty());
    }
}
