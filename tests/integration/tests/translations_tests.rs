//! Client translations loader against a live server
//!
//! Run with: cargo test -p integration-tests --test translations_tests

use std::sync::Arc;
use std::time::Duration;

use accounts_client::{
    ClientConfig, ClientEvent, FileStorage, LoadSource, LoadState, LocalStorage, RecordingAlerts,
    ReqwestTransport, TranslationLoader, TRANSLATIONS_STORAGE_KEY,
};
use integration_tests::{temp_cache_dir, TestServer};

fn loader(url: &str, cache_dir: &std::path::Path, alerts: Arc<RecordingAlerts>) -> TranslationLoader {
    TranslationLoader::new(
        Some(url.to_string()),
        Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap()),
        Arc::new(FileStorage::new(cache_dir)),
        alerts,
    )
}

#[tokio::test]
async fn test_server_then_cache() {
    let mut server = TestServer::start().await.unwrap();
    let url = server.url("/fr/translations");
    let cache_dir = temp_cache_dir();

    // Online: fetched from the server and cached
    let alerts = Arc::new(RecordingAlerts::new());
    let online = loader(&url, &cache_dir, alerts.clone());
    let mut events = online.subscribe();
    assert_eq!(online.load().await.unwrap(), LoadSource::Server);
    assert_eq!(events.recv().await.unwrap(), ClientEvent::TranslationsLoaded);
    assert_eq!(
        online.translator().read().trans("Bad credentials.", "fr"),
        "Identifiants invalides."
    );
    assert!(FileStorage::new(&cache_dir)
        .has(TRANSLATIONS_STORAGE_KEY)
        .await
        .unwrap());

    server.stop().await;

    // Offline: served from the cache without alerting
    let offline = loader(&url, &cache_dir, alerts.clone());
    let mut events = offline.subscribe();
    assert_eq!(offline.load().await.unwrap(), LoadSource::Cache);
    assert_eq!(offline.state(), LoadState::Succeeded(LoadSource::Cache));
    assert_eq!(events.recv().await.unwrap(), ClientEvent::TranslationsLoaded);
    assert_eq!(offline.translator().read().trans("word.home", "fr"), "Accueil");
    assert!(alerts.is_empty());

    let _ = std::fs::remove_dir_all(cache_dir);
}

#[tokio::test]
async fn test_offline_without_cache_alerts_once() {
    let mut server = TestServer::start().await.unwrap();
    let url = server.url("/en/translations");
    server.stop().await;

    let alerts = Arc::new(RecordingAlerts::new());
    let cache_dir = temp_cache_dir();
    let offline = loader(&url, &cache_dir, alerts.clone());

    assert!(offline.load().await.is_err());
    assert_eq!(offline.state(), LoadState::Failed);
    assert_eq!(alerts.len(), 1);
}

#[tokio::test]
async fn test_loader_from_config() {
    let server = TestServer::start().await.unwrap();
    let cache_dir = temp_cache_dir();
    let config = ClientConfig::new(server.url("/en/translations")).with_cache_dir(&cache_dir);

    let loader = TranslationLoader::from_config(&config).unwrap();
    assert_eq!(loader.load().await.unwrap(), LoadSource::Server);

    let missing = TranslationLoader::from_config(&ClientConfig::default()).unwrap();
    let err = missing.load().await.unwrap_err();
    assert_eq!(err.to_string(), "Translations URL not specified.");

    let _ = std::fs::remove_dir_all(cache_dir);
}
