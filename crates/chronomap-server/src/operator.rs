//! Operator endpoints for metadata reload control.
//!
//! Separate from the read-only map API and mounted only when
//! `server.operator_api` is enabled. Reloads triggered here share the
//! store's reload lock with `SIGWINCH` reloads, so the two never overlap.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/operator/status` | Reload history and waypoint counts |
//! | `POST` | `/api/operator/reload` | Re-read all metadata from disk |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chronomap_meta::{ReloadStatus, ReloadSummary};
use tracing::info;

use crate::error::ApiError;
use crate::reload::{ReloadError, reload_store};
use crate::state::AppState;

/// Response body for a successful `POST /api/operator/reload`.
#[derive(Debug, serde::Serialize)]
pub struct ReloadResponse {
    /// Always `true`; failures are reported as errors.
    pub ok: bool,
    /// Counts loaded by this reload.
    #[serde(flatten)]
    pub summary: ReloadSummary,
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Report reload history and the current waypoint counts.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ReloadStatus> {
    Json(state.store.status())
}

// ---------------------------------------------------------------------------
// POST /api/operator/reload
// ---------------------------------------------------------------------------

/// Reload all map metadata.
///
/// On failure the store keeps whatever its reload policy leaves in place
/// and the error message is returned with status 500.
pub async fn post_reload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ApiError> {
    info!("operator requested metadata reload");
    match reload_store(Arc::clone(&state.store)).await {
        Ok(summary) => Ok(Json(ReloadResponse { ok: true, summary })),
        Err(ReloadError::Metadata(e)) => Err(ApiError::ReloadFailed(e.to_string())),
        Err(ReloadError::Task(e)) => Err(ApiError::Internal(e.to_string())),
    }
}
