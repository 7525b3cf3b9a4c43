//! Reading metadata files from disk.
//!
//! Layout below the metadata root:
//!
//! ```text
//! <root>/colors                       palette
//! <root>/waypoints/<dimension>/*.txt  waypoint files
//! ```

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dimension::Dimension;
use crate::error::{MetadataError, ParseError};
use crate::palette::{Palette, parse_palette};
use crate::waypoint::{Waypoint, parse_waypoints};

/// File name of the palette under the metadata root.
pub const PALETTE_FILE: &str = "colors";

/// Directory under the metadata root holding per-dimension waypoint files.
pub const WAYPOINTS_DIR: &str = "waypoints";

/// Path of the palette file for a metadata root.
pub fn palette_path(root: &Path) -> PathBuf {
    root.join(PALETTE_FILE)
}

/// Directory holding the waypoint files of one dimension.
pub fn dimension_dir(root: &Path, dimension: Dimension) -> PathBuf {
    root.join(WAYPOINTS_DIR).join(dimension.dir_name())
}

/// Read and parse a palette file.
pub fn load_palette(path: &Path) -> Result<Palette, MetadataError> {
    let source = read(path)?;
    parse_palette(&source).map_err(in_file(path))
}

/// Read and parse one waypoint file.
pub fn load_waypoint_file(path: &Path, palette: &Palette) -> Result<Vec<Waypoint>, MetadataError> {
    let source = read(path)?;
    let waypoints = parse_waypoints(&source, palette).map_err(in_file(path))?;
    debug!(path = %path.display(), count = waypoints.len(), "waypoint file loaded");
    Ok(waypoints)
}

/// Load every waypoint file with the given extension in `dir`.
///
/// Files are read in file-name order and their waypoints concatenated.
/// Subdirectories are ignored. The first failure aborts the whole load.
pub fn load_dimension(
    dir: &Path,
    extension: &str,
    palette: &Palette,
) -> Result<Vec<Waypoint>, MetadataError> {
    let mut waypoints = Vec::new();
    for path in waypoint_files(dir, extension)? {
        waypoints.extend(load_waypoint_file(&path, palette)?);
    }
    Ok(waypoints)
}

/// List the non-directory entries of `dir` ending in `.{extension}`.
fn waypoint_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, MetadataError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if path.extension() != Some(OsStr::new(extension)) {
            continue;
        }
        if fs::metadata(&path).map_err(io_error(&path))?.is_dir() {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Read a file as text.
///
/// Bytes that are not UTF-8 are a syntax error on the line holding the
/// first invalid byte, not an I/O failure.
fn read(path: &Path) -> Result<String, MetadataError> {
    let bytes = fs::read(path).map_err(io_error(path))?;
    String::from_utf8(bytes).map_err(|e| {
        let valid = e.as_bytes().get(..e.utf8_error().valid_up_to());
        let newlines = valid.unwrap_or_default().iter().filter(|&&b| b == b'\n');
        MetadataError::Parse {
            path: path.to_owned(),
            source: ParseError::Syntax {
                line: newlines.count().saturating_add(1),
                reason: "invalid UTF-8",
            },
        }
    })
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MetadataError + use<> {
    let path = path.to_owned();
    move |source| MetadataError::Io { path, source }
}

fn in_file(path: &Path) -> impl FnOnce(ParseError) -> MetadataError + use<> {
    let path = path.to_owned();
    move |source| MetadataError::Parse { path, source }
}
