//! Map metadata ingestion and query index for the Chronomap viewer.
//!
//! Map metadata is a directory of hand-written text files: a palette of
//! named colors and, per dimension, waypoint files describing points of
//! interest. This crate parses those files, keeps the result in memory,
//! and answers zoom-filtered queries for the HTTP layer.
//!
//! # Modules
//!
//! - [`palette`] -- `name = spec` color palette grammar.
//! - [`waypoint`] -- `@name` block grammar and [`Waypoint`] records.
//! - [`dimension`] -- The three fixed dimensions and identifier resolution.
//! - [`loader`] -- Reading the on-disk layout.
//! - [`store`] -- [`MetadataStore`] with per-dimension atomic slots and the
//!   reload protocol.
//! - [`query`] -- Zoom filtering and the client-facing point shape.
//! - [`error`] -- Parse and load errors.

pub mod dimension;
pub mod error;
pub mod loader;
pub mod palette;
pub mod query;
pub mod store;
pub mod waypoint;

// Re-export primary types at crate root.
pub use dimension::Dimension;
pub use error::{ErrorKind, MetadataError, ParseError};
pub use palette::{ColorSpec, Palette, parse_palette};
pub use query::{DEFAULT_ZOOM_LEVEL, PointsView, VisiblePoint};
pub use store::{MetadataStore, ReloadPolicy, ReloadStatus, ReloadSummary};
pub use waypoint::{Waypoint, WaypointKind, WaypointList, parse_waypoints};
