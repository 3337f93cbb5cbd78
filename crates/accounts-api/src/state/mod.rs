//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context, configuration and the backing pools.

use std::sync::Arc;

use accounts_cache::RedisPool;
use accounts_common::AppConfig;
use accounts_db::PgPool;
use accounts_service::ServiceContext;

/// Connection pools probed by the readiness check.
///
/// `None` means the in-memory backend is in use.
#[derive(Debug, Clone, Default)]
pub struct Backends {
    pub database: Option<PgPool>,
    pub redis: Option<RedisPool>,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Application configuration
    config: Arc<AppConfig>,
    backends: Backends,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            backends: Backends::default(),
        }
    }

    #[must_use]
    pub fn with_backends(mut self, backends: Backends) -> Self {
        self.backends = backends;
        self
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    pub fn default_locale(&self) -> &str {
        &self.config.locale.default_locale
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("backends", &self.backends)
            .finish()
    }
}
