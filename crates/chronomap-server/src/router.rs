//! Axum router construction for the map API.
//!
//! Assembles all routes into a single [`Router`] with CORS and request
//! tracing. In debug mode every path outside `/api` falls through to the
//! static file directory so the client can be served from the same origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;

/// Build the complete Axum router for the map server.
///
/// The router includes:
/// - `GET /api/points` -- visible waypoints
/// - `GET /api/block` -- block lookup
/// - `GET /api/initial-state` -- client bootstrap values
/// - `GET /api/operator/status` -- reload status, when `state.operator_api`
/// - `POST /api/operator/reload` -- trigger a reload, when `state.operator_api`
/// - fallback -- static files when `state.static_dir` is set
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.static_dir.clone();

    // Map API
    let mut router = Router::new()
        .route("/api/points", get(handlers::get_points))
        .route("/api/block", get(handlers::get_block))
        .route("/api/initial-state", get(handlers::get_initial_state));

    // Operator API
    if state.operator_api {
        router = router
            .route("/api/operator/status", get(operator::get_status))
            .route("/api/operator/reload", post(operator::post_reload));
    }

    let router = router.with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(cors).layer(TraceLayer::new_for_http())
}
