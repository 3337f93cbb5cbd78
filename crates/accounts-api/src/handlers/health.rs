//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// State of one backing service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Up,
    Down,
    /// In-memory backend, nothing to probe
    Memory,
}

impl BackendStatus {
    fn is_healthy(self) -> bool {
        !matches!(self, Self::Down)
    }
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: BackendStatus,
    pub redis: BackendStatus,
}

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check with dependency health
///
/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let backends = state.backends();

    let database = match &backends.database {
        Some(pool) => match pool.acquire().await {
            Ok(_) => BackendStatus::Up,
            Err(_) => BackendStatus::Down,
        },
        None => BackendStatus::Memory,
    };

    let redis = match &backends.redis {
        Some(pool) => match pool.health_check().await {
            Ok(()) => BackendStatus::Up,
            Err(_) => BackendStatus::Down,
        },
        None => BackendStatus::Memory,
    };

    let ready = database.is_healthy() && redis.is_healthy();
    let response = ReadinessResponse {
        status: if ready { "ready" } else { "degraded" },
        database,
        redis,
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
