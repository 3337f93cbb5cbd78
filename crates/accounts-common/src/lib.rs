//! # accounts-common
//!
//! Shared utilities including configuration, error handling, password and
//! CSRF handling, translations, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod i18n;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, verify_password, CsrfTokenManager, CsrfTokenStorage, PasswordPolicy,
    PasswordService, ACCOUNT_DELETE_INTENTION, ACCOUNT_INTENTION, ADMIN_INTENTION,
    AUTHENTICATE_INTENTION,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, LocaleConfig,
    RateLimitConfig, RedisConfig, ServerConfig, SessionConfig, TranslationsConfig,
};
pub use error::{AppError, AppResult, ErrorResponse, BAD_CREDENTIALS, INVALID_CSRF_TOKEN};
pub use i18n::{Catalogue, Translator, TranslatorError, DEFAULT_DOMAIN, VALIDATORS_DOMAIN};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
