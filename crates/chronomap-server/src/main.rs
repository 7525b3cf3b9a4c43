//! Chronomap map server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `chronomap.yaml` and the environment
//! 2. Initialize structured logging (tracing)
//! 3. Load map metadata; a failure here aborts startup
//! 4. Install the `SIGWINCH` reload listener
//! 5. Serve HTTP until `SIGINT`, `SIGTERM` or `SIGUSR1`

use std::sync::Arc;

use chronomap_meta::MetadataStore;
use chronomap_server::config::{ChronomapConfig, LoggingConfig};
use chronomap_server::error::AppError;
use chronomap_server::reload::{self, ReloadError};
use chronomap_server::server::{ServerConfig, start_server};
use chronomap_server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ChronomapConfig::load()?;
    init_logging(&config.logging);

    info!(
        debug = config.debug,
        metadata = %config.metadata.path.display(),
        port = config.server.port,
        "chronomap-server starting"
    );

    let store = Arc::new(
        MetadataStore::new(config.metadata.path.clone())
            .with_extension(config.metadata.waypoint_extension.clone())
            .with_policy(config.metadata.reload_policy),
    );

    match reload::reload_store(Arc::clone(&store)).await {
        Ok(summary) => info!(waypoints = ?summary.waypoints, "initial map metadata loaded"),
        Err(ReloadError::Metadata(source)) => return Err(AppError::Metadata { source }),
        Err(ReloadError::Task(e)) => {
            return Err(AppError::Task {
                message: e.to_string(),
            });
        }
    }

    let state = Arc::new(AppState::from_config(Arc::clone(&store), &config));
    info!(socket = %state.blocks.socket_path().display(), "block lookups enabled");
    if let Some(dir) = &state.static_dir {
        info!(dir = %dir.display(), "serving static files");
    }
    if state.operator_api {
        info!("operator endpoints enabled");
    }

    let listener = reload::spawn_reload_listener(store).map_err(|e| AppError::Task {
        message: format!("failed to install reload signal handler: {e}"),
    })?;

    let result = start_server(
        &ServerConfig::from(&config.server),
        state,
        reload::shutdown_signal(),
    )
    .await;

    listener.abort();
    result?;
    info!("chronomap-server exited");
    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
