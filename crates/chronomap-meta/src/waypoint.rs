//! Waypoint file parsing.
//!
//! A waypoint file is a sequence of blocks. Each block opens with a name
//! line starting with `@`, followed by indented `key = value` data lines:
//!
//! ```text
//! ; central station area
//! @Central Station      ; the name ends at the comment
//!  yomi = centralstation
//!  color = rail
//!  x = 120
//!  z = -340
//!  type = train
//!  stationid = CEN
//!  zoomlevel = 40
//! ```
//!
//! The first character of a line decides its role: `@` opens a block, a
//! space continues the current block, `;` marks a comment. Anything else is
//! a syntax error. A block becomes a [`Waypoint`] once the next name line
//! or the end of input is reached.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::ParseError;
use crate::palette::{ColorSpec, Palette};

/// The display category of a waypoint.
///
/// The numeric codes are what the map client expects in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaypointKind {
    /// An ordinary point of interest.
    Default,
    /// A text-only area label.
    Label,
    /// A railway station.
    Train,
    /// A subway station.
    Subway,
}

impl WaypointKind {
    /// Numeric code sent to clients.
    pub const fn code(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Label => 1,
            Self::Train => 2,
            Self::Subway => 3,
        }
    }

    /// The token used for this kind in waypoint files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Label => "label",
            Self::Train => "train",
            Self::Subway => "subway",
        }
    }
}

impl fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a `type` token is not a known [`WaypointKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown waypoint type `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for WaypointKind {
    type Err = UnknownKind;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "label" => Ok(Self::Label),
            "train" => Ok(Self::Train),
            "subway" => Ok(Self::Subway),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

/// A single point of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waypoint {
    /// Display name.
    pub name: String,
    /// Phonetic reading used for search; empty when not given.
    pub reading: String,
    /// Free-form description; empty when not given.
    pub detail: String,
    /// Station identifier for train graphs; empty when not given.
    pub station_id: String,
    /// Display category.
    pub kind: WaypointKind,
    /// Color resolved from the palette at parse time.
    pub color: ColorSpec,
    /// World X coordinate.
    pub x: i32,
    /// World Z coordinate.
    pub z: i32,
    /// Minimum zoom level at which the waypoint is shown.
    pub zoom_threshold: u32,
}

/// The waypoints of one dimension, in file order.
///
/// This is the unit a [`MetadataStore`](crate::MetadataStore) publishes and
/// readers share. It dereferences to a slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaypointList(Vec<Waypoint>);

impl From<Vec<Waypoint>> for WaypointList {
    fn from(waypoints: Vec<Waypoint>) -> Self {
        Self(waypoints)
    }
}

impl Deref for WaypointList {
    type Target = [Waypoint];

    fn deref(&self) -> &[Waypoint] {
        &self.0
    }
}

/// Parse the full contents of a waypoint file.
///
/// Colors are resolved against `palette`. Blocks are returned in file
/// order; a file without any block yields an empty list.
pub fn parse_waypoints(source: &str, palette: &Palette) -> Result<Vec<Waypoint>, ParseError> {
    let mut waypoints = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for (line, text) in (1_usize..).zip(source.lines()) {
        match classify(text).map_err(|reason| ParseError::Syntax { line, reason })? {
            Line::Skip => {}
            Line::Name(name) => {
                if let Some(block) = current.replace(Block::new(name, line)) {
                    waypoints.push(block.finish(palette)?);
                }
            }
            Line::Data { key, value } => {
                let block = current.as_mut().ok_or(ParseError::NameMissing { line })?;
                block.values.insert(key, value);
            }
        }
    }

    if let Some(block) = current {
        waypoints.push(block.finish(palette)?);
    }

    Ok(waypoints)
}

/// The role of a single line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// Blank, comment-only, or a data line holding only a comment.
    Skip,
    /// `@name` line.
    Name(&'a str),
    /// ` key = value` line.
    Data { key: &'a str, value: &'a str },
}

fn classify(line: &str) -> Result<Line<'_>, &'static str> {
    if line.trim().is_empty() {
        return Ok(Line::Skip);
    }
    if let Some(name) = read_point_name(line) {
        return Ok(Line::Name(name));
    }
    if line.starts_with(' ') {
        return Ok(match read_point_data(line)? {
            Some((key, value)) => Line::Data { key, value },
            None => Line::Skip,
        });
    }
    if line.starts_with(';') {
        return Ok(Line::Skip);
    }
    Err("line must start with `@`, a space, or `;`")
}

/// Extract the display name from an `@` line.
///
/// Returns `None` if the line is not a name line.
pub(crate) fn read_point_name(line: &str) -> Option<&str> {
    line.strip_prefix('@')
        .map(|rest| strip_comment(rest).trim())
}

/// Split an indented data line into a trimmed `(key, value)` pair.
///
/// Returns `Ok(None)` when the line holds nothing but a comment.
pub(crate) fn read_point_data(line: &str) -> Result<Option<(&str, &str)>, &'static str> {
    let Some(body) = line.strip_prefix(' ') else {
        return Err("data line must start with a space");
    };

    let data = strip_comment(body).trim();
    if data.is_empty() {
        return Ok(None);
    }

    let (key, value) = data.split_once('=').ok_or("data line has no `=`")?;
    Ok(Some((key.trim(), value.trim())))
}

fn strip_comment(s: &str) -> &str {
    s.split_once(';').map_or(s, |(head, _)| head)
}

/// Key/value pairs collected for one waypoint.
struct Block<'a> {
    name: &'a str,
    line: usize,
    values: BTreeMap<&'a str, &'a str>,
}

impl<'a> Block<'a> {
    const fn new(name: &'a str, line: usize) -> Self {
        Self {
            name,
            line,
            values: BTreeMap::new(),
        }
    }

    fn get(&self, key: &str) -> &'a str {
        self.values.get(key).copied().unwrap_or_default()
    }

    /// Convert the collected values into a waypoint.
    fn finish(self, palette: &Palette) -> Result<Waypoint, ParseError> {
        let color_name = self.get("color");
        let color = palette
            .get(color_name)
            .cloned()
            .ok_or_else(|| ParseError::UndefinedColor {
                line: self.line,
                waypoint: self.name.to_owned(),
                color: color_name.to_owned(),
            })?;

        let x = self.integer("x")?;
        let z = self.integer("z")?;

        let kind_token = self.get("type");
        let kind = kind_token
            .parse::<WaypointKind>()
            .map_err(|UnknownKind(kind)| ParseError::UndefinedType {
                line: self.line,
                waypoint: self.name.to_owned(),
                kind,
            })?;

        let zoom_threshold = self.integer("zoomlevel")?;

        Ok(Waypoint {
            name: self.name.to_owned(),
            reading: self.get("yomi").to_owned(),
            detail: self.get("detail").to_owned(),
            station_id: self.get("stationid").to_owned(),
            kind,
            color,
            x,
            z,
            zoom_threshold,
        })
    }

    fn integer<T: FromStr<Err = std::num::ParseIntError>>(
        &self,
        field: &'static str,
    ) -> Result<T, ParseError> {
        let value = self.get(field);
        value.parse().map_err(|source| ParseError::NumericParse {
            line: self.line,
            waypoint: self.name.to_owned(),
            field,
            value: value.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::palette::parse_palette;

    fn palette() -> Palette {
        parse_palette("blue = #00f\n").unwrap()
    }

    fn block(kind: &str) -> String {
        format!(
            "@foo\n yomi = A\n detail = B\n color = blue\n x = 1\n z = 2\n \
             type = {kind}\n zoomlevel = 70\n"
        )
    }

    #[test]
    fn reads_point_name() {
        assert_eq!(read_point_name("@foo"), Some("foo"));
        assert_eq!(read_point_name("@ foo  "), Some("foo"));
        assert_eq!(read_point_name("@ foo ;comment"), Some("foo"));
        assert_eq!(read_point_name("@"), Some(""));
        assert_eq!(read_point_name(" @foo"), None);
    }

    #[test]
    fn reads_point_data() {
        assert_eq!(read_point_data(" foo = bar").unwrap(), Some(("foo", "bar")));
        assert_eq!(
            read_point_data(" foo = bar;comment").unwrap(),
            Some(("foo", "bar"))
        );
        assert_eq!(
            read_point_data("   foo=bar  ").unwrap(),
            Some(("foo", "bar"))
        );
    }

    #[test]
    fn data_value_keeps_everything_after_first_equals() {
        assert_eq!(
            read_point_data(" detail = a = b").unwrap(),
            Some(("detail", "a = b"))
        );
    }

    #[test]
    fn data_value_is_not_unescaped() {
        assert_eq!(
            read_point_data(" foo = bar\\\\baz").unwrap(),
            Some(("foo", "bar\\\\baz"))
        );
    }

    #[test]
    fn comment_only_data_line_is_empty() {
        assert_eq!(read_point_data(" ;comment").unwrap(), None);
        assert_eq!(read_point_data("    ").unwrap(), None);
    }

    #[test]
    fn data_line_without_equals_fails() {
        assert!(read_point_data(" foo bar").is_err());
    }

    #[test]
    fn parses_default_block() {
        let points = parse_waypoints(&block("default"), &palette()).unwrap();
        assert_eq!(points.len(), 1);
        let wp = &points[0];
        assert_eq!(wp.name, "foo");
        assert_eq!(wp.reading, "A");
        assert_eq!(wp.detail, "B");
        assert_eq!(wp.station_id, "");
        assert_eq!(wp.color.as_str(), "#00f");
        assert_eq!((wp.x, wp.z), (1, 2));
        assert_eq!(wp.kind, WaypointKind::Default);
        assert_eq!(wp.zoom_threshold, 70);
    }

    #[test]
    fn parses_every_kind() {
        for (token, kind) in [
            ("default", WaypointKind::Default),
            ("label", WaypointKind::Label),
            ("train", WaypointKind::Train),
            ("subway", WaypointKind::Subway),
        ] {
            let points = parse_waypoints(&block(token), &palette()).unwrap();
            assert_eq!(points[0].kind, kind);
        }
    }

    #[test]
    fn station_id_is_carried() {
        let source = format!("{} stationid = STN\n", block("train"));
        let points = parse_waypoints(&source, &palette()).unwrap();
        assert_eq!(points[0].station_id, "STN");
    }

    #[test]
    fn kind_match_is_case_sensitive() {
        let err = parse_waypoints(&block("Train"), &palette()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedType);
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn undefined_color_fails() {
        let source = block("default").replace("color = blue", "color = green");
        let err = parse_waypoints(&source, &palette()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UndefinedColor { ref color, .. } if color == "green"
        ));
    }

    #[test]
    fn missing_color_fails() {
        let source = block("default").replace(" color = blue\n", "");
        let err = parse_waypoints(&source, &palette()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedColor);
    }

    #[test]
    fn non_integer_coordinates_fail() {
        let source = block("default").replace("x = 1", "x = east");
        let err = parse_waypoints(&source, &palette()).unwrap_err();
        assert!(matches!(err, ParseError::NumericParse { field: "x", .. }));

        let source = block("default").replace(" zoomlevel = 70\n", "");
        let err = parse_waypoints(&source, &palette()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::NumericParse {
                field: "zoomlevel",
                ..
            }
        ));
    }

    #[test]
    fn negative_zoom_threshold_fails() {
        let source = block("default").replace("zoomlevel = 70", "zoomlevel = -1");
        let err = parse_waypoints(&source, &palette()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericParse);
    }

    #[test]
    fn negative_coordinates_parse() {
        let source = block("default").replace("x = 1", "x = -1200");
        let points = parse_waypoints(&source, &palette()).unwrap();
        assert_eq!(points[0].x, -1200);
    }

    #[test]
    fn blocks_keep_file_order() {
        let source = format!(
            "; header\n{}\n{}",
            block("default"),
            block("label").replace("@foo", "@bar ; second")
        );
        let points = parse_waypoints(&source, &palette()).unwrap();
        let names: Vec<_> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["foo", "bar"]);
    }

    #[test]
    fn later_duplicate_key_wins() {
        let source = format!("{} x = 9\n", block("default"));
        let points = parse_waypoints(&source, &palette()).unwrap();
        assert_eq!(points[0].x, 9);
    }

    #[test]
    fn data_before_name_fails() {
        let err = parse_waypoints("; c\n x = 1\n@foo\n", &palette()).unwrap_err();
        assert!(matches!(err, ParseError::NameMissing { line: 2 }));
    }

    #[test]
    fn comment_data_line_before_name_is_skipped() {
        let points = parse_waypoints(" ; nothing yet\n", &palette()).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn unexpected_line_start_fails() {
        let source = format!("{}foo = bar\n", block("default"));
        let err = parse_waypoints(&source, &palette()).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 9, .. }));

        let err = parse_waypoints("\t@foo\n", &palette()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn empty_file_yields_nothing() {
        assert!(parse_waypoints("", &palette()).unwrap().is_empty());
        let points = parse_waypoints("; only comments\n\n", &palette()).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn waypoint_list_reads_as_slice() {
        let points = parse_waypoints(&block("label"), &palette()).unwrap();
        let list = WaypointList::from(points);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].kind, WaypointKind::Label);
        assert!(WaypointList::default().is_empty());
    }

    #[test]
    fn bad_block_aborts_file() {
        let second = block("bogus").replace("@foo", "@bar");
        let source = format!("{}{second}", block("default"));
        let err = parse_waypoints(&source, &palette()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UndefinedType { line: 9, ref waypoint, .. } if waypoint == "bar"
        ));
    }
}
