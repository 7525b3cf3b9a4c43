//! Shared application state for the map API server.

use std::path::PathBuf;
use std::sync::Arc;

use chronomap_meta::MetadataStore;

use crate::block::BlockInfoClient;
use crate::config::ChronomapConfig;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// metadata store is the only mutable part; its slots are swapped by
/// reloads while handlers read them.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The waypoint index.
    pub store: Arc<MetadataStore>,
    /// Client for per-coordinate block lookups.
    pub blocks: BlockInfoClient,
    /// Asset URL prefix reported to the client.
    pub assets_prefix: String,
    /// Directory served as static files, present only in debug mode.
    pub static_dir: Option<PathBuf>,
    /// Whether the operator status and reload endpoints are mounted.
    pub operator_api: bool,
}

impl AppState {
    /// Create state around a store, with no static serving, no operator
    /// endpoints and an empty asset prefix.
    pub const fn new(store: Arc<MetadataStore>, blocks: BlockInfoClient) -> Self {
        Self {
            store,
            blocks,
            assets_prefix: String::new(),
            static_dir: None,
            operator_api: false,
        }
    }

    /// Create state from loaded configuration.
    pub fn from_config(store: Arc<MetadataStore>, config: &ChronomapConfig) -> Self {
        Self {
            store,
            blocks: BlockInfoClient::from_config(&config.block_info),
            assets_prefix: config.server.assets_prefix.clone(),
            static_dir: config.debug.then(|| config.server.static_path.clone()),
            operator_api: config.server.operator_api,
        }
    }
}
