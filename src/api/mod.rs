use crate::state::{RoomState, StateStore};
use axum::{extract::State, response::Json, routing::get, Router};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state for the status API
pub struct StatusAppState {
    pub store: Arc<StateStore>,
}

/// Create the status query router.
///
/// CORS is wide open: the dashboard is served from another origin and the
/// snapshot carries nothing sensitive.
pub fn create_status_router(state: Arc<StatusAppState>) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// GET /status - Full per-room snapshot
async fn get_status(
    State(state): State<Arc<StatusAppState>>,
) -> Json<BTreeMap<String, RoomState>> {
    Json(state.store.snapshot())
}

/// GET /health - Liveness probe
async fn health() -> &'static str {
    "ok"
}
