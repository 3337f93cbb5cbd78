//! Translations loader
//!
//! Fetches the message catalogue from the server and falls back to the last
//! copy kept in local storage when the network fails. Every successful load
//! is announced on a broadcast channel as [`ClientEvent::TranslationsLoaded`].
//!
//! ```text
//! Idle -> Requesting -> Succeeded(Server)
//!                    -> CacheLookup -> Succeeded(Cache)
//!                                   -> Failed
//! ```

use std::sync::Arc;

use accounts_common::Translator;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::ajax::{
    ajax_error_message, validate_ajax_response, AjaxRequest, AjaxTransport, ReqwestTransport,
    ValidateOptions,
};
use crate::alert::{AlertSink, ErrorMessage, LogAlerts};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::storage::{FileStorage, LocalStorage, MemoryStorage};

/// Local storage key of the last good catalogue
pub const TRANSLATIONS_STORAGE_KEY: &str = "_translations";

const EVENT_BUFFER: usize = 16;

/// Notifications sent to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    TranslationsLoaded,
}

impl ClientEvent {
    /// DOM event name
    pub fn name(self) -> &'static str {
        match self {
            Self::TranslationsLoaded => "translationsLoaded",
        }
    }
}

/// Where the applied catalogue came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Server,
    Cache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Requesting,
    CacheLookup,
    Succeeded(LoadSource),
    Failed,
}

/// Network-first, cache-fallback catalogue loader
pub struct TranslationLoader {
    url: Option<String>,
    transport: Arc<dyn AjaxTransport>,
    storage: Arc<dyn LocalStorage>,
    alerts: Arc<dyn AlertSink>,
    translator: Arc<RwLock<Translator>>,
    events: broadcast::Sender<ClientEvent>,
    state: Mutex<LoadState>,
}

impl TranslationLoader {
    pub fn new(
        url: Option<String>,
        transport: Arc<dyn AjaxTransport>,
        storage: Arc<dyn LocalStorage>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            url,
            transport,
            storage,
            alerts,
            translator: Arc::new(RwLock::new(Translator::default())),
            events,
            state: Mutex::new(LoadState::Idle),
        }
    }

    /// `reqwest` transport, file storage when a cache directory is set,
    /// alerts to the log
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let storage: Arc<dyn LocalStorage> = match &config.cache_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::new(
            config.translations_url.clone(),
            Arc::new(ReqwestTransport::new(config.request_timeout)?),
            storage,
            Arc::new(LogAlerts),
        ))
    }

    /// Translator the catalogue is applied to
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<RwLock<Translator>>) -> Self {
        self.translator = translator;
        self
    }

    pub fn translator(&self) -> Arc<RwLock<Translator>> {
        Arc::clone(&self.translator)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> LoadState {
        *self.state.lock()
    }

    fn set_state(&self, state: LoadState) {
        *self.state.lock() = state;
    }

    /// Load the catalogue.
    ///
    /// Fails only when neither the server nor the cache produced one; the
    /// user has then been alerted exactly once.
    #[instrument(skip(self), fields(url = self.url.as_deref().unwrap_or("")))]
    pub async fn load(&self) -> ClientResult<LoadSource> {
        let url = self
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ClientError::NotSpecified("Translations URL"))?;

        self.set_state(LoadState::Requesting);
        let request = AjaxRequest::get(url).prepare()?;

        let fetched = match self.transport.send(&request).await {
            Ok(response) if response.is_success() => self.apply_server(&response.data()).await,
            Ok(response) => Err(ClientError::Http {
                status: response.status,
                message: ajax_error_message(
                    response.json().as_ref(),
                    &response.text,
                    Some(response.status),
                ),
            }),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(()) => {
                info!("Translations loaded successfully from server.");
                self.loaded(LoadSource::Server);
                Ok(LoadSource::Server)
            }
            Err(e) => self.fall_back(e).await,
        }
    }

    async fn apply_server(&self, data: &Value) -> ClientResult<()> {
        let options = ValidateOptions {
            no_success_key: true,
            no_alert: true,
            error_prefix: None,
        };
        validate_ajax_response(data, &options, self.alerts.as_ref())?;

        let json = serde_json::to_string(data)?;
        self.apply(&json)?;

        if let Err(e) = self.storage.set(TRANSLATIONS_STORAGE_KEY, &json).await {
            warn!(error = %e, "Failed to cache translations");
        }
        Ok(())
    }

    async fn fall_back(&self, err: ClientError) -> ClientResult<LoadSource> {
        self.set_state(LoadState::CacheLookup);
        debug!(error = %err, "Translations request failed, trying cache");

        let cached = match self.storage.get(TRANSLATIONS_STORAGE_KEY).await {
            Ok(cached) => cached.filter(|c| !c.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read cached translations");
                None
            }
        };

        let from_cache = match cached {
            Some(json) => match self.apply(&json) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Cached translations unusable, evicting");
                    if let Err(e) = self.storage.remove(TRANSLATIONS_STORAGE_KEY).await {
                        warn!(error = %e, "Failed to evict cached translations");
                    }
                    false
                }
            },
            None => false,
        };

        if from_cache {
            info!("Translations loaded successfully from cache.");
            self.loaded(LoadSource::Cache);
        } else {
            self.set_state(LoadState::Failed);
        }

        ErrorMessage::new(err.to_string())
            .no_alert(from_cache)
            .emit(self.alerts.as_ref());

        if from_cache {
            Ok(LoadSource::Cache)
        } else {
            Err(err)
        }
    }

    fn apply(&self, json: &str) -> ClientResult<()> {
        self.translator.write().load_json(json)?;
        Ok(())
    }

    fn loaded(&self, source: LoadSource) {
        self.set_state(LoadState::Succeeded(source));
        // No listeners is fine
        let _ = self.events.send(ClientEvent::TranslationsLoaded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ajax::{AjaxResponse, PreparedRequest};
    use crate::alert::RecordingAlerts;
    use async_trait::async_trait;
    use tokio::sync::broadcast::error::TryRecvError;

    const CATALOGUE: &str =
        r#"{"fallback":"en","defaultDomain":"messages","translations":{"en":{"messages":{"word.home":"Home"}}}}"#;

    /// Answers every request with the same outcome
    struct StubTransport {
        outcome: Result<AjaxResponse, String>,
    }

    #[async_trait]
    impl AjaxTransport for StubTransport {
        async fn send(&self, _request: &PreparedRequest) -> ClientResult<AjaxResponse> {
            self.outcome.clone().map_err(ClientError::Transport)
        }
    }

    struct Harness {
        loader: TranslationLoader,
        storage: Arc<MemoryStorage>,
        alerts: Arc<RecordingAlerts>,
    }

    fn harness(outcome: Result<AjaxResponse, String>) -> Harness {
        let storage = Arc::new(MemoryStorage::new());
        let alerts = Arc::new(RecordingAlerts::new());
        let loader = TranslationLoader::new(
            Some("http://localhost/en/translations".into()),
            Arc::new(StubTransport { outcome }),
            storage.clone(),
            alerts.clone(),
        );
        Harness {
            loader,
            storage,
            alerts,
        }
    }

    #[tokio::test]
    async fn test_server_success_caches_and_notifies() {
        let h = harness(Ok(AjaxResponse::new(200, CATALOGUE)));
        let mut events = h.loader.subscribe();

        assert_eq!(h.loader.load().await.unwrap(), LoadSource::Server);
        assert_eq!(h.loader.state(), LoadState::Succeeded(LoadSource::Server));
        assert_eq!(events.try_recv().unwrap(), ClientEvent::TranslationsLoaded);
        assert_eq!(events.try_recv().unwrap_err(), TryRecvError::Empty);

        let cached = h.storage.get(TRANSLATIONS_STORAGE_KEY).await.unwrap().unwrap();
        let cached: Value = serde_json::from_str(&cached).unwrap();
        assert_eq!(cached["translations"]["en"]["messages"]["word.home"], "Home");
        assert_eq!(h.loader.translator().read().trans("word.home", "en"), "Home");
        assert!(h.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_uses_cache_silently() {
        let h = harness(Err("connection refused".into()));
        h.storage.set(TRANSLATIONS_STORAGE_KEY, CATALOGUE).await.unwrap();
        let mut events = h.loader.subscribe();

        assert_eq!(h.loader.load().await.unwrap(), LoadSource::Cache);
        assert_eq!(h.loader.state(), LoadState::Succeeded(LoadSource::Cache));
        assert_eq!(events.try_recv().unwrap(), ClientEvent::TranslationsLoaded);
        assert_eq!(h.loader.translator().read().trans("word.home", "en"), "Home");
        assert!(h.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_without_cache_alerts_once() {
        let h = harness(Ok(AjaxResponse::new(503, "")));
        let mut events = h.loader.subscribe();

        let err = h.loader.load().await.unwrap_err();
        assert_eq!(err.to_string(), "Code 503 error.");
        assert_eq!(h.loader.state(), LoadState::Failed);
        assert_eq!(events.try_recv().unwrap_err(), TryRecvError::Empty);

        let alerts = h.alerts.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Code 503 error.");
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_evicted() {
        let h = harness(Err("timed out".into()));
        h.storage.set(TRANSLATIONS_STORAGE_KEY, "{not json").await.unwrap();

        assert!(h.loader.load().await.is_err());
        assert!(!h.storage.has(TRANSLATIONS_STORAGE_KEY).await.unwrap());
        assert_eq!(h.alerts.len(), 1);
        assert_eq!(h.alerts.alerts()[0].message, "timed out");
    }

    #[tokio::test]
    async fn test_invalid_payload_falls_back() {
        let h = harness(Ok(AjaxResponse::new(200, r#"{"error":"Maintenance"}"#)));
        h.storage.set(TRANSLATIONS_STORAGE_KEY, CATALOGUE).await.unwrap();

        assert_eq!(h.loader.load().await.unwrap(), LoadSource::Cache);
        assert!(h.alerts.is_empty());
        // The cached copy is left as it was
        assert_eq!(
            h.storage.get(TRANSLATIONS_STORAGE_KEY).await.unwrap().as_deref(),
            Some(CATALOGUE)
        );
    }

    #[tokio::test]
    async fn test_string_payload_is_not_applied() {
        let body = serde_json::to_string(CATALOGUE).unwrap();
        let h = harness(Ok(AjaxResponse::new(200, body)));

        let err = h.loader.load().await.unwrap_err();
        assert_eq!(err.to_string(), "Unexpected response from server.");
        assert!(!h.storage.has(TRANSLATIONS_STORAGE_KEY).await.unwrap());
        assert_eq!(h.loader.translator().read().trans("word.home", "en"), "word.home");
    }

    #[tokio::test]
    async fn test_missing_url_is_a_programming_error() {
        let loader = TranslationLoader::new(
            None,
            Arc::new(StubTransport {
                outcome: Ok(AjaxResponse::new(200, CATALOGUE)),
            }),
            Arc::new(MemoryStorage::new()),
            Arc::new(RecordingAlerts::new()),
        );
        let err = loader.load().await.unwrap_err();
        assert_eq!(err.to_string(), "Translations URL not specified.");
        assert!(err.is_programming_error());
        assert_eq!(loader.state(), LoadState::Idle);
    }

    #[test]
    fn test_event_name() {
        assert_eq!(ClientEvent::TranslationsLoaded.name(), "translationsLoaded");
    }
}
