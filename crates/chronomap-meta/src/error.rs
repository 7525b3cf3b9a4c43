//! Error types for the `chronomap-meta` crate.
//!
//! Parsing a single file fails with a [`ParseError`], which always names
//! the line that caused it. Loading from disk wraps those failures together
//! with the offending path in a [`MetadataError`].

use std::num::ParseIntError;
use std::path::PathBuf;

/// Errors produced while parsing the contents of a palette or waypoint file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A line does not follow the file grammar.
    #[error("syntax error on line {line}: {reason}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: &'static str,
    },

    /// A palette name was defined more than once.
    #[error("duplicate palette entry `{name}` on line {line}")]
    DuplicateEntry {
        /// 1-based line number of the repeated definition.
        line: usize,
        /// The repeated color name.
        name: String,
    },

    /// A waypoint refers to a color name the palette does not define.
    #[error("waypoint `{waypoint}` on line {line} uses undefined color `{color}`")]
    UndefinedColor {
        /// 1-based line number of the waypoint's name line.
        line: usize,
        /// Display name of the waypoint.
        waypoint: String,
        /// The unresolved color name.
        color: String,
    },

    /// A waypoint `type` is not one of the known kinds.
    #[error("waypoint `{waypoint}` on line {line} has undefined type `{kind}`")]
    UndefinedType {
        /// 1-based line number of the waypoint's name line.
        line: usize,
        /// Display name of the waypoint.
        waypoint: String,
        /// The rejected type token.
        kind: String,
    },

    /// A numeric waypoint field is not a base-10 integer.
    #[error("waypoint `{waypoint}` on line {line}: `{field}` is not an integer (`{value}`)")]
    NumericParse {
        /// 1-based line number of the waypoint's name line.
        line: usize,
        /// Display name of the waypoint.
        waypoint: String,
        /// The key that failed (`x`, `z` or `zoomlevel`).
        field: &'static str,
        /// The raw value.
        value: String,
        /// The underlying integer parse error.
        #[source]
        source: ParseIntError,
    },

    /// A data line appeared before any `@name` line.
    #[error("data line {line} appears before any waypoint name")]
    NameMissing {
        /// 1-based line number of the orphan data line.
        line: usize,
    },
}

impl ParseError {
    /// The 1-based line number this error refers to.
    pub const fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::DuplicateEntry { line, .. }
            | Self::UndefinedColor { line, .. }
            | Self::UndefinedType { line, .. }
            | Self::NumericParse { line, .. }
            | Self::NameMissing { line } => *line,
        }
    }

    /// The category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::DuplicateEntry { .. } => ErrorKind::DuplicateEntry,
            Self::UndefinedColor { .. } => ErrorKind::UndefinedColor,
            Self::UndefinedType { .. } => ErrorKind::UndefinedType,
            Self::NumericParse { .. } => ErrorKind::NumericParse,
            Self::NameMissing { .. } => ErrorKind::NameMissing,
        }
    }
}

/// Errors produced while loading metadata from disk.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A file or directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file was read but its contents are invalid.
    #[error("{}: {source}", path.display())]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The parse failure.
        #[source]
        source: ParseError,
    },
}

impl MetadataError {
    /// The category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::Parse { source, .. } => source.kind(),
        }
    }
}

/// Coarse classification of every load-time failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed line in either file format.
    Syntax,
    /// Repeated palette name.
    DuplicateEntry,
    /// Waypoint references an unknown palette name.
    UndefinedColor,
    /// Waypoint `type` outside the closed set of kinds.
    UndefinedType,
    /// `x`, `z` or `zoomlevel` is not an integer.
    NumericParse,
    /// Data line before any name line.
    NameMissing,
    /// File or directory access failure.
    Io,
}
