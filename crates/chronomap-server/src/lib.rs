//! HTTP API server for the Chronomap viewer.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Map endpoints** for the waypoints visible at a zoom level, the
//!   block at a coordinate, and client bootstrap values
//! - **Operator endpoints** for reload status and on-demand reloads
//! - **Static files** from a configured directory in debug mode
//!
//! # Architecture
//!
//! Waypoints come from a [`MetadataStore`] shared through [`AppState`].
//! Handlers read the store's per-dimension snapshots without locking, so
//! a reload triggered by `SIGWINCH` or the operator API never blocks a
//! query. Block lookups are forwarded to a separate process over a Unix
//! socket (see [`block`]).
//!
//! [`MetadataStore`]: chronomap_meta::MetadataStore

pub mod block;
pub mod config;
pub mod error;
pub mod handlers;
pub mod operator;
pub mod reload;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use config::ChronomapConfig;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
