//! Health endpoint reporting per-backend connectivity.
//!
//! Always answers 200; the body says which backends are reachable. The
//! broker snapshot comes from the resilience layer without touching the
//! backend; the database and cache checks are live round trips.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::adapters::broker::{BrokerHealth, QueueClient};
use crate::ports::{Cache, CacheHealth};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct HealthState {
    pool: PgPool,
    cache: Arc<dyn Cache>,
    queue: QueueClient,
}

impl HealthState {
    pub fn new(pool: PgPool, cache: Arc<dyn Cache>, queue: QueueClient) -> Self {
        Self { pool, cache, queue }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Database connectivity, a live `SELECT 1` round trip.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
}

/// Cache connectivity: the supervisor snapshot plus a probe-key round trip.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    #[serde(flatten)]
    pub status: CacheHealth,
    pub responsive: bool,
}

/// Full health report for the service.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseHealth,
    pub cache: CacheReport,
    pub broker: BrokerHealth,
}

fn overall_status(database: &DatabaseHealth, cache: &CacheReport, broker: &BrokerHealth) -> &'static str {
    if database.connected && cache.responsive && broker.state.is_connected() {
        "ok"
    } else {
        "degraded"
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /health - Per-backend connectivity report
pub async fn health(State(state): State<HealthState>) -> Response {
    let database = DatabaseHealth {
        connected: ping_database(&state.pool).await,
    };
    let cache = CacheReport {
        status: state.cache.status().await,
        responsive: state.cache.health_check().await,
    };
    let broker = state.queue.status().await;

    let response = HealthResponse {
        status: overall_status(&database, &cache, &broker),
        database,
        cache,
        broker,
    };

    (StatusCode::OK, Json(response)).into_response()
}

async fn ping_database(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Creates the health router.
pub fn health_routes(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}
