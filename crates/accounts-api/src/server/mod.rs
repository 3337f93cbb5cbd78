//! Server setup and initialization
//!
//! Provides the main application builder and server runner. Backends with
//! no configuration fall back to in-memory implementations.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use accounts_cache::{MemorySessionStore, RedisPool, RedisSessionStore, SessionStore};
use accounts_common::{AppConfig, AppError, Translator};
use accounts_core::{UserRepository, ZoneConverter};
use accounts_db::{create_pool, run_migrations, MemoryUserRepository, PgUserRepository};
use accounts_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::{AppState, Backends};

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = apply_middleware(create_router(), state.config());
    router.merge(health_routes()).with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let mut backends = Backends::default();

    let user_repo: Arc<dyn UserRepository> = match &config.database {
        Some(settings) => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&accounts_db::DatabaseConfig::from(settings))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");
            backends.database = Some(pool.clone());
            Arc::new(PgUserRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, users are kept in memory");
            Arc::new(MemoryUserRepository::new())
        }
    };

    let session_store: Arc<dyn SessionStore> = match &config.redis {
        Some(settings) => {
            let pool = RedisPool::from_config(settings).map_err(|e| AppError::Cache(e.to_string()))?;
            backends.redis = Some(pool.clone());
            Arc::new(RedisSessionStore::with_ttl(pool, config.session.ttl_seconds))
        }
        None => {
            warn!("REDIS_URL not set, sessions are kept in memory");
            Arc::new(MemorySessionStore::new(Duration::from_secs(
                config.session.ttl_seconds,
            )))
        }
    };

    let translator = match &config.translations.catalogue_path {
        Some(path) => Translator::from_path(path),
        None => Translator::bundled(),
    }
    .map_err(|e| AppError::Config(e.to_string()))?;

    let zones = ZoneConverter::parse(&config.locale.timezone)?;

    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .session_store(session_store)
        .translator(Arc::new(translator))
        .zones(zones)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config).with_backends(backends))
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;

    // Create app state
    let state = create_app_state(config).await?;

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, addr).await
}
