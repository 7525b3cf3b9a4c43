//! The three fixed map dimensions.

use std::fmt;
use std::str::FromStr;

/// One of the three map regions, each with its own waypoint list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// The surface world.
    Overworld,
    /// The Nether.
    Nether,
    /// The End.
    End,
}

impl Dimension {
    /// All dimensions in reload order.
    pub const ALL: [Self; 3] = [Self::Overworld, Self::Nether, Self::End];

    /// Directory name under `<root>/waypoints/`.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Overworld => "overworld",
            Self::Nether => "nether",
            Self::End => "end",
        }
    }

    /// Resolve a client-supplied dimension identifier.
    ///
    /// Matching is permissive and looks only at the first character: `n...`
    /// is the Nether, `e...` is the End, and anything else (including the
    /// empty string) is the Overworld. `"nowhere"` therefore means Nether.
    pub fn resolve(id: &str) -> Self {
        match id.chars().next() {
            Some('n') => Self::Nether,
            Some('e') => Self::End,
            _ => Self::Overworld,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Error returned when a string is not an exact dimension name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dimension `{0}`")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    /// Exact match on the directory name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dim| dim.dir_name() == s)
            .ok_or_else(|| UnknownDimension(s.to_owned()))
    }
}
