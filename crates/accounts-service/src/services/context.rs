//! Service context - dependency container for services
//!
//! Holds the repository, session store and helpers needed by services.

use std::sync::Arc;

use accounts_cache::{SessionData, SessionStore};
use accounts_common::{AppError, CsrfTokenManager, PasswordService, Translator};
use accounts_core::{UserRepository, ZoneConverter};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the dependency container passed to every service. It provides:
/// - The user repository (PostgreSQL or in-memory)
/// - The session store (Redis or in-memory)
/// - Password hashing and CSRF token helpers
/// - The message catalogue and the working time zone
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    session_store: Arc<dyn SessionStore>,
    passwords: PasswordService,
    csrf: CsrfTokenManager,
    translator: Arc<Translator>,
    zones: ZoneConverter,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    // === Stores ===

    /// Get the session store
    pub fn session_store(&self) -> &dyn SessionStore {
        self.session_store.as_ref()
    }

    // === Helpers ===

    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    pub fn csrf(&self) -> &CsrfTokenManager {
        &self.csrf
    }

    pub fn translator(&self) -> &Translator {
        self.translator.as_ref()
    }

    /// Shared handle to the translator
    pub fn translator_arc(&self) -> Arc<Translator> {
        Arc::clone(&self.translator)
    }

    pub fn zones(&self) -> &ZoneConverter {
        &self.zones
    }

    /// Check a submitted token against the session's token for `intention`
    pub fn verify_csrf(&self, session: &SessionData, intention: &str, token: &str) -> ServiceResult<()> {
        if self.csrf.is_valid(session, intention, token) {
            Ok(())
        } else {
            Err(AppError::InvalidCsrfToken.into())
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("session_store", &"...")
            .field("zones", &self.zones)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    session_store: Option<Arc<dyn SessionStore>>,
    passwords: Option<PasswordService>,
    translator: Option<Arc<Translator>>,
    zones: Option<ZoneConverter>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn passwords(mut self, passwords: PasswordService) -> Self {
        self.passwords = Some(passwords);
        self
    }

    pub fn translator(mut self, translator: Arc<Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn zones(mut self, zones: ZoneConverter) -> Self {
        self.zones = Some(zones);
        self
    }

    /// Build the ServiceContext
    ///
    /// The translator defaults to the bundled catalogue, the zone converter
    /// to UTC and the password service to the default policy.
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if a required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let translator = match self.translator {
            Some(translator) => translator,
            None => Arc::new(Translator::bundled().map_err(|e| ServiceError::internal(e.to_string()))?),
        };

        Ok(ServiceContext {
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::internal("user_repo is required"))?,
            session_store: self
                .session_store
                .ok_or_else(|| ServiceError::internal("session_store is required"))?,
            passwords: self.passwords.unwrap_or_default(),
            csrf: CsrfTokenManager::new(),
            translator,
            zones: self.zones.unwrap_or_default(),
        })
    }
}
