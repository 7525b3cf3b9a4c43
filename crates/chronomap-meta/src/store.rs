//! The in-memory metadata store and its reload protocol.
//!
//! [`MetadataStore`] owns one waypoint list per [`Dimension`]. Each list
//! lives in its own [`ArcSwap`] slot: readers load a slot without locking
//! and always see either the complete previous list or the complete new
//! one. A reload parses the palette once, then loads the three dimensions
//! in [`Dimension::ALL`] order.
//!
//! What a failed reload leaves behind is decided by [`ReloadPolicy`]:
//!
//! - [`ReloadPolicy::PerDimension`] publishes each dimension as soon as it
//!   loads. If the Nether fails, the Overworld already holds new data while
//!   the Nether and the End keep their previous lists.
//! - [`ReloadPolicy::AllOrNothing`] stages all three lists and publishes
//!   them only when every dimension loaded.
//!
//! Reloads are serialized by an internal mutex; queries never take it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::{debug, info, warn};

use crate::dimension::Dimension;
use crate::error::MetadataError;
use crate::loader;
use crate::palette::Palette;
use crate::query::PointsView;
use crate::waypoint::{Waypoint, WaypointList};

/// Default extension of waypoint files.
pub const DEFAULT_WAYPOINT_EXTENSION: &str = "txt";

/// How a reload publishes dimensions when one of them fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Publish each dimension as soon as it loads; keep earlier dimensions
    /// updated when a later one fails.
    #[default]
    PerDimension,
    /// Publish all dimensions together, only after every one loaded.
    AllOrNothing,
}

/// Counts reported by a successful reload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReloadSummary {
    /// Number of palette entries parsed.
    pub palette_entries: usize,
    /// Number of waypoints loaded per dimension.
    pub waypoints: BTreeMap<Dimension, usize>,
}

/// Snapshot of the store's reload history.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReloadStatus {
    /// Number of reloads that completed successfully.
    pub generation: u64,
    /// Number of reloads that failed.
    pub failures: u64,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
    /// Policy applied to failed reloads.
    pub policy: ReloadPolicy,
    /// Current number of waypoints per dimension.
    pub waypoints: BTreeMap<Dimension, usize>,
}

#[derive(Debug, Default)]
struct ReloadLog {
    generation: u64,
    failures: u64,
    last_error: Option<String>,
}

/// Per-dimension waypoint index with hot reload.
#[derive(Debug)]
pub struct MetadataStore {
    root: PathBuf,
    extension: String,
    policy: ReloadPolicy,
    overworld: ArcSwap<WaypointList>,
    nether: ArcSwap<WaypointList>,
    end: ArcSwap<WaypointList>,
    reload_lock: Mutex<()>,
    log: Mutex<ReloadLog>,
}

impl MetadataStore {
    /// Create an empty store reading from `root`.
    ///
    /// Nothing is loaded until [`reload`](Self::reload) is called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_WAYPOINT_EXTENSION.to_owned(),
            policy: ReloadPolicy::default(),
            overworld: ArcSwap::from_pointee(WaypointList::default()),
            nether: ArcSwap::from_pointee(WaypointList::default()),
            end: ArcSwap::from_pointee(WaypointList::default()),
            reload_lock: Mutex::new(()),
            log: Mutex::new(ReloadLog::default()),
        }
    }

    /// Use a different waypoint file extension (without the dot).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Use a different reload policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ReloadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The metadata root this store reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The reload policy in effect.
    pub const fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    /// Re-read all metadata from disk.
    ///
    /// A palette failure leaves every dimension untouched. A dimension
    /// failure is handled according to the store's [`ReloadPolicy`]. The
    /// error is returned to the caller and never retried.
    pub fn reload(&self) -> Result<ReloadSummary, MetadataError> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        info!(root = %self.root.display(), policy = ?self.policy, "reloading map metadata");
        let result = self.reload_locked();

        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        match &result {
            Ok(summary) => {
                log.generation = log.generation.saturating_add(1);
                log.last_error = None;
                info!(
                    generation = log.generation,
                    palette_entries = summary.palette_entries,
                    waypoints = ?summary.waypoints,
                    "map metadata reloaded"
                );
            }
            Err(e) => {
                log.failures = log.failures.saturating_add(1);
                log.last_error = Some(e.to_string());
                warn!(error = %e, "map metadata reload failed");
            }
        }

        result
    }

    fn reload_locked(&self) -> Result<ReloadSummary, MetadataError> {
        let palette = loader::load_palette(&loader::palette_path(&self.root))?;
        debug!(entries = palette.len(), "palette loaded");

        let mut waypoints = BTreeMap::new();
        match self.policy {
            ReloadPolicy::PerDimension => {
                for dimension in Dimension::ALL {
                    let list = self.load(dimension, &palette)?;
                    waypoints.insert(dimension, list.len());
                    self.slot(dimension).store(Arc::new(list.into()));
                }
            }
            ReloadPolicy::AllOrNothing => {
                let mut staged = Vec::with_capacity(Dimension::ALL.len());
                for dimension in Dimension::ALL {
                    staged.push((dimension, self.load(dimension, &palette)?));
                }
                for (dimension, list) in staged {
                    waypoints.insert(dimension, list.len());
                    self.slot(dimension).store(Arc::new(list.into()));
                }
            }
        }

        Ok(ReloadSummary {
            palette_entries: palette.len(),
            waypoints,
        })
    }

    fn load(
        &self,
        dimension: Dimension,
        palette: &Palette,
    ) -> Result<Vec<Waypoint>, MetadataError> {
        let dir = loader::dimension_dir(&self.root, dimension);
        let list = loader::load_dimension(&dir, &self.extension, palette)?;
        debug!(%dimension, count = list.len(), "dimension loaded");
        Ok(list)
    }

    const fn slot(&self, dimension: Dimension) -> &ArcSwap<WaypointList> {
        match dimension {
            Dimension::Overworld => &self.overworld,
            Dimension::Nether => &self.nether,
            Dimension::End => &self.end,
        }
    }

    /// The current waypoint list of a dimension.
    pub fn waypoints(&self, dimension: Dimension) -> Arc<WaypointList> {
        self.slot(dimension).load_full()
    }

    /// Waypoints of `dimension` visible at `zoom_level`.
    pub fn visible(&self, dimension: Dimension, zoom_level: i32) -> PointsView {
        PointsView::new(self.waypoints(dimension), zoom_level)
    }

    /// Resolve a client dimension identifier and query it.
    ///
    /// See [`Dimension::resolve`] for the matching rule.
    pub fn query(&self, dimension: &str, zoom_level: i32) -> PointsView {
        self.visible(Dimension::resolve(dimension), zoom_level)
    }

    /// Whether at least one reload has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
            > 0
    }

    /// Reload history and current per-dimension counts.
    pub fn status(&self) -> ReloadStatus {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        ReloadStatus {
            generation: log.generation,
            failures: log.failures,
            last_error: log.last_error.clone(),
            policy: self.policy,
            waypoints: Dimension::ALL
                .into_iter()
                .map(|dim| (dim, self.slot(dim).load().len()))
                .collect(),
        }
    }
}
