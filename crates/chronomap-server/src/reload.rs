//! Metadata reload triggers and process signals.
//!
//! Reloads read the filesystem synchronously, so they run on Tokio's
//! blocking pool. On Unix, `SIGWINCH` asks the running server to reload;
//! `SIGINT`, `SIGTERM` and `SIGUSR1` shut it down.

use std::sync::Arc;

use chronomap_meta::{MetadataError, MetadataStore, ReloadSummary};
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

/// Failures of a reload run on the blocking pool.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// The metadata could not be loaded.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// The blocking task panicked or was cancelled.
    #[error("reload task failed: {0}")]
    Task(#[from] JoinError),
}

/// Run [`MetadataStore::reload`] without blocking the async runtime.
pub async fn reload_store(store: Arc<MetadataStore>) -> Result<ReloadSummary, ReloadError> {
    Ok(tokio::task::spawn_blocking(move || store.reload()).await??)
}

/// Reload the store every time the process receives `SIGWINCH`.
///
/// A failed reload is logged and left alone; the next signal tries again.
#[cfg(unix)]
pub fn spawn_reload_listener(store: Arc<MetadataStore>) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut winch = signal(SignalKind::window_change())?;

    Ok(tokio::spawn(async move {
        while winch.recv().await.is_some() {
            info!("SIGWINCH received, reloading map metadata");
            if let Err(e) = reload_store(Arc::clone(&store)).await {
                warn!(error = %e, "map metadata wasn't updated");
            }
        }
    }))
}

/// Signal-driven reloads are only available on Unix.
#[cfg(not(unix))]
pub fn spawn_reload_listener(_store: Arc<MetadataStore>) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async {}))
}

/// Resolve when the process is asked to stop.
///
/// Falls back to Ctrl-C if the Unix handlers cannot be installed.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let (Ok(mut interrupt), Ok(mut terminate), Ok(mut usr1)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::user_defined1()),
    ) else {
        warn!("failed to install shutdown signal handlers, falling back to Ctrl-C");
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        return;
    };

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
        _ = usr1.recv() => {}
    }
    info!("shutdown signal received");
}

/// Resolve when the process is asked to stop.
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
