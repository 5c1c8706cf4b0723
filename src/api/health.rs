//! Liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

/// Ordered from best to worst so the overall status is the maximum
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub latency_ms: u64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentHealth>,
}

/// GET /health - process is up
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION"),
        components: Vec::new(),
    })
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /ready - dependencies answer
///
/// An empty knowledge base still serves sessions (every question ends in a
/// clarification request), so it only degrades readiness.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let components = vec![
        knowledge_base_health(&state).await,
        session_store_health(&state).await,
    ];

    let status = components
        .iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(HealthStatus::Healthy);

    let code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            components,
        }),
    )
}

async fn knowledge_base_health(state: &AppState) -> ComponentHealth {
    let started = Instant::now();
    let kb = &state.knowledge_base;

    let (status, detail) = match kb.health_check().await {
        Err(e) => (HealthStatus::Unhealthy, e.to_string()),
        Ok(()) => match kb.document_count().await {
            Ok(0) => (HealthStatus::Degraded, "no documents loaded".to_string()),
            Ok(count) => (
                HealthStatus::Healthy,
                format!("{} documents in {} ({})", count, kb.name(), kb.backend()),
            ),
            Err(e) => (HealthStatus::Unhealthy, e.to_string()),
        },
    };

    ComponentHealth {
        name: "knowledge_base",
        status,
        detail: Some(detail),
        latency_ms: started.elapsed().as_millis() as u64,
    }
}

async fn session_store_health(state: &AppState) -> ComponentHealth {
    let started = Instant::now();

    let (status, detail) = match state.session_service.session_count().await {
        Ok(count) => (HealthStatus::Healthy, format!("{} sessions", count)),
        Err(e) => (HealthStatus::Unhealthy, e.to_string()),
    };

    ComponentHealth {
        name: "session_store",
        status,
        detail: Some(detail),
        latency_ms: started.elapsed().as_millis() as u64,
    }
}
