//! CSRF tokens bound to a session and an intention
//!
//! Each form declares an intention (`authenticate`, `account`, ...). The
//! token for an intention lives in the session until it is refreshed.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Intention of the login form
pub const AUTHENTICATE_INTENTION: &str = "authenticate";

/// Intention of the register / edit form
pub const ACCOUNT_INTENTION: &str = "account";

/// Intention of the account removal form
pub const ACCOUNT_DELETE_INTENTION: &str = "account_delete";

/// Intention of admin actions
pub const ADMIN_INTENTION: &str = "admin";

const TOKEN_BYTES: usize = 32;

/// Where tokens are kept between requests (usually the session)
pub trait CsrfTokenStorage {
    fn csrf_token(&self, intention: &str) -> Option<&str>;

    fn set_csrf_token(&mut self, intention: &str, token: String);

    fn remove_csrf_token(&mut self, intention: &str) -> Option<String>;
}

/// Issues and checks CSRF tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfTokenManager;

impl CsrfTokenManager {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Random URL-safe token
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Current token for the intention, issuing one if absent
    pub fn token<S: CsrfTokenStorage + ?Sized>(&self, storage: &mut S, intention: &str) -> String {
        if let Some(existing) = storage.csrf_token(intention) {
            return existing.to_string();
        }
        self.refresh(storage, intention)
    }

    /// Replace the token for the intention
    pub fn refresh<S: CsrfTokenStorage + ?Sized>(&self, storage: &mut S, intention: &str) -> String {
        let token = self.generate();
        storage.set_csrf_token(intention, token.clone());
        token
    }

    /// Compare a submitted token with the stored one in constant time
    pub fn is_valid<S: CsrfTokenStorage + ?Sized>(
        &self,
        storage: &S,
        intention: &str,
        submitted: &str,
    ) -> bool {
        match storage.csrf_token(intention) {
            Some(expected) if !submitted.is_empty() => {
                expected.as_bytes().ct_eq(submitted.as_bytes()).into()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStorage(HashMap<String, String>);

    impl CsrfTokenStorage for MapStorage {
        fn csrf_token(&self, intention: &str) -> Option<&str> {
            self.0.get(intention).map(String::as_str)
        }

        fn set_csrf_token(&mut self, intention: &str, token: String) {
            self.0.insert(intention.to_string(), token);
        }

        fn remove_csrf_token(&mut self, intention: &str) -> Option<String> {
            self.0.remove(intention)
        }
    }

    #[test]
    fn test_token_is_stable_until_refresh() {
        let manager = CsrfTokenManager::new();
        let mut storage = MapStorage::default();

        let first = manager.token(&mut storage, AUTHENTICATE_INTENTION);
        let second = manager.token(&mut storage, AUTHENTICATE_INTENTION);
        assert_eq!(first, second);

        let refreshed = manager.refresh(&mut storage, AUTHENTICATE_INTENTION);
        assert_ne!(first, refreshed);
    }

    #[test]
    fn test_validation() {
        let manager = CsrfTokenManager::new();
        let mut storage = MapStorage::default();
        let token = manager.token(&mut storage, AUTHENTICATE_INTENTION);

        assert!(manager.is_valid(&storage, AUTHENTICATE_INTENTION, &token));
        assert!(!manager.is_valid(&storage, AUTHENTICATE_INTENTION, "forged"));
        assert!(!manager.is_valid(&storage, AUTHENTICATE_INTENTION, ""));
        assert!(!manager.is_valid(&storage, ACCOUNT_INTENTION, &token));
    }

    #[test]
    fn test_near_miss_tokens_are_rejected() {
        let manager = CsrfTokenManager::new();
        let mut storage = MapStorage::default();
        let token = manager.token(&mut storage, AUTHENTICATE_INTENTION);

        let mut flipped = token.clone().into_bytes();
        flipped[0] = if flipped[0] == b'A' { b'B' } else { b'A' };
        let flipped = String::from_utf8(flipped).unwrap();

        assert!(!manager.is_valid(&storage, AUTHENTICATE_INTENTION, &flipped));
        assert!(!manager.is_valid(&storage, AUTHENTICATE_INTENTION, &token[..token.len() - 1]));
        assert!(!manager.is_valid(&storage, AUTHENTICATE_INTENTION, &format!("{token}x")));
    }

    #[test]
    fn test_removed_token_is_invalid() {
        let manager = CsrfTokenManager::new();
        let mut storage = MapStorage::default();
        let token = manager.token(&mut storage, ACCOUNT_INTENTION);
        storage.remove_csrf_token(ACCOUNT_INTENTION);
        assert!(!manager.is_valid(&storage, ACCOUNT_INTENTION, &token));
    }

    #[test]
    fn test_generated_tokens_are_url_safe() {
        let token = CsrfTokenManager::new().generate();
        assert_eq!(token.len(), 43);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
