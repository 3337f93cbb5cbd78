//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

/// Password accepted by the default policy
pub const TEST_PASSWORD: &str = "TestPass123";

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Registration form data
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            username: format!("testuser{suffix}"),
            email: format!("test{suffix}@example.com"),
            password: TEST_PASSWORD.to_string(),
        }
    }

    /// Fields as posted by the register page
    pub fn fields<'a>(&'a self, token: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("username", self.username.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("password_repeat", self.password.as_str()),
            ("_token", token),
        ]
    }
}

/// Fields as posted by the login page
pub fn login_fields<'a>(identifier: &'a str, password: &'a str, token: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("username", identifier),
        ("password", password),
        ("_csrf_token", token),
    ]
}
