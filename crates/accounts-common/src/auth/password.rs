//! Password hashing, verification and strength policy
//!
//! Hashes use Argon2id with a random salt per password.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use std::sync::{Arc, OnceLock};

use crate::error::AppError;

/// Hashed on first use; checked against when there is no stored hash
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

/// Hash a password using Argon2id
///
/// # Errors
/// Returns `AppError::PasswordEncoding` if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordEncoding(e.to_string()))
}

/// Verify a password against a stored hash.
///
/// A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// Strength rules applied to new passwords.
///
/// Violations are reported as translation keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
        }
    }
}

impl PasswordPolicy {
    /// First violated rule, as a translation key
    pub fn violation(&self, password: &str) -> Option<&'static str> {
        if password.trim().is_empty() {
            return Some("password.blank");
        }
        if password.chars().count() < self.min_length {
            return Some("password.too_short");
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            return Some("password.missing_uppercase");
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            return Some("password.missing_lowercase");
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Some("password.missing_digit");
        }
        None
    }

    /// # Errors
    /// Returns `AppError::Validation` carrying the violated rule key
    pub fn check(&self, password: &str) -> Result<(), AppError> {
        match self.violation(password) {
            Some(key) => Err(AppError::Validation(key.to_string())),
            None => Ok(()),
        }
    }
}

/// Password service for dependency injection
#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    policy: PasswordPolicy,
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: PasswordPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// # Errors
    /// Returns `AppError::PasswordEncoding` if hashing fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_password(password)
    }

    /// `false` for a missing or malformed hash.
    /// A missing hash still runs one argon2 verification.
    pub fn verify(&self, password: &str, hash: Option<&str>) -> bool {
        match hash {
            Some(hash) => verify_password(password, hash),
            None => {
                let dummy = self.dummy_hash();
                if !dummy.is_empty() {
                    verify_password(password, dummy);
                }
                false
            }
        }
    }

    /// Whether a verification without a stored hash has happened
    #[must_use]
    pub fn has_dummy_hash(&self) -> bool {
        self.dummy_hash.get().is_some()
    }

    fn dummy_hash(&self) -> &str {
        self.dummy_hash
            .get_or_init(|| hash_password(DUMMY_PASSWORD).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let hash = hash_password("SecurePassword123!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, hash_password("SecurePassword123!").unwrap());
    }

    #[test]
    fn test_verify() {
        let hash = hash_password("SecurePassword123!").unwrap();
        assert!(verify_password("SecurePassword123!", &hash));
        assert!(!verify_password("WrongPassword123!", &hash));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_service_verify_missing_hash() {
        let service = PasswordService::new();
        let hash = service.hash("Abcdefg1").unwrap();
        assert!(service.verify("Abcdefg1", Some(&hash)));
        assert!(!service.verify("Abcdefg1", None));
    }

    #[test]
    fn test_missing_hash_still_runs_argon2() {
        let service = PasswordService::new();
        assert!(!service.has_dummy_hash());
        assert!(!service.verify(DUMMY_PASSWORD, None));
        assert!(service.has_dummy_hash());
        assert!(service.dummy_hash().starts_with("$argon2id$"));

        // Clones share the computed hash
        let clone = service.clone();
        assert_eq!(clone.dummy_hash(), service.dummy_hash());
    }

    #[test]
    fn test_policy_violations() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.violation("   "), Some("password.blank"));
        assert_eq!(policy.violation("Ab1"), Some("password.too_short"));
        assert_eq!(policy.violation("lowercase123"), Some("password.missing_uppercase"));
        assert_eq!(policy.violation("UPPERCASE123"), Some("password.missing_lowercase"));
        assert_eq!(policy.violation("NoDigitsHere"), Some("password.missing_digit"));
        assert_eq!(policy.violation("MyP@ssw0rd!"), None);
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
        };
        assert!(policy.check("pass").is_ok());
        assert!(matches!(policy.check(""), Err(AppError::Validation(k)) if k == "password.blank"));
    }
}
