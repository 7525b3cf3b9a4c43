//! Map API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/points` | Waypoints of a dimension visible at a zoom level |
//! | `GET` | `/api/block` | Block at a coordinate, via the block-info socket |
//! | `GET` | `/api/initial-state` | Client bootstrap values |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chronomap_meta::{DEFAULT_ZOOM_LEVEL, Dimension, PointsView};

use crate::block::Block;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/points`.
///
/// Both fields are kept as raw strings so malformed values fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, serde::Deserialize)]
pub struct PointsQuery {
    /// Dimension identifier (`overworld`, `nether`, `end`, or any prefix).
    pub dimen: Option<String>,
    /// Current client zoom level.
    pub zoom_level: Option<String>,
}

/// Query parameters for `GET /api/block`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct BlockQuery {
    /// Exact dimension name; anything else means the Overworld.
    pub dimen: Option<String>,
    /// World X coordinate.
    pub x: Option<String>,
    /// World Z coordinate.
    pub z: Option<String>,
}

/// Response body for `GET /api/initial-state`.
#[derive(Debug, serde::Serialize)]
pub struct InitialState {
    /// Prefix for tile and asset URLs.
    pub prefix: String,
}

// ---------------------------------------------------------------------------
// GET /api/points
// ---------------------------------------------------------------------------

/// List the waypoints of a dimension visible at the requested zoom level.
///
/// A missing or non-integer `zoom_level` is treated as
/// [`DEFAULT_ZOOM_LEVEL`].
pub async fn get_points(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointsQuery>,
) -> Json<PointsView> {
    let zoom_level = query
        .zoom_level
        .as_deref()
        .and_then(|z| z.trim().parse().ok())
        .unwrap_or(DEFAULT_ZOOM_LEVEL);

    Json(
        state
            .store
            .query(query.dimen.as_deref().unwrap_or_default(), zoom_level),
    )
}

// ---------------------------------------------------------------------------
// GET /api/block
// ---------------------------------------------------------------------------

/// Look up the block at a coordinate.
pub async fn get_block(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlockQuery>,
) -> Result<Json<Block>, ApiError> {
    let x = coordinate("x", query.x.as_deref())?;
    let z = coordinate("z", query.z.as_deref())?;
    let dimension = query
        .dimen
        .as_deref()
        .and_then(|d| d.parse::<Dimension>().ok())
        .unwrap_or(Dimension::Overworld);

    state
        .blocks
        .lookup(dimension, x, z)
        .await
        .map(Json)
        .ok_or_else(|| no_block(dimension, x, z))
}

fn no_block(dimension: Dimension, x: i32, z: i32) -> ApiError {
    ApiError::NotFound(format!("no block info for {dimension} ({x}, {z})"))
}

fn coordinate(name: &str, raw: Option<&str>) -> Result<i32, ApiError> {
    let raw = raw.unwrap_or_default();
    let message = || format!("`{name}` must be an integer, got `{raw}`");
    raw.trim()
        .parse()
        .ok()
        .ok_or_else(|| ApiError::InvalidQuery(message()))
}

// ---------------------------------------------------------------------------
// GET /api/initial-state
// ---------------------------------------------------------------------------

/// Values the client needs before it starts requesting tiles.
pub async fn get_initial_state(State(state): State<Arc<AppState>>) -> Json<InitialState> {
    Json(InitialState {
        prefix: state.assets_prefix.clone(),
    })
}
