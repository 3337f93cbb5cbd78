//! Client configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Where the client fetches translations and caches them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Translations endpoint, e.g. `http://host/en/translations`
    pub translations_url: Option<String>,
    /// Directory of the file-backed local storage; memory when unset
    pub cache_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            translations_url: None,
            cache_dir: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn new(translations_url: impl Into<String>) -> Self {
        Self {
            translations_url: Some(translations_url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// `CLIENT_TRANSLATIONS_URL`, `CLIENT_CACHE_DIR`, `CLIENT_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Self {
            translations_url: env::var("CLIENT_TRANSLATIONS_URL")
                .ok()
                .filter(|u| !u.trim().is_empty()),
            cache_dir: env::var("CLIENT_CACHE_DIR").ok().map(PathBuf::from),
            request_timeout: env::var("CLIENT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
        }
    }
}
