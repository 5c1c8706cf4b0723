use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use super::health::{health_check, live_check, ready_check};
use super::state::AppState;
use super::v1;

/// Probes at the root, the session API under `/v1`
pub fn build_router(state: AppState) -> Router {
    let probes = Router::new()
        .route("/health", get(health_check))
        .route("/live", get(live_check))
        .route("/ready", get(ready_check));

    probes
        .nest("/v1", v1::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
