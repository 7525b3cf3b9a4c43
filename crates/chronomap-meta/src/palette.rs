//! Palette file parsing.
//!
//! A palette maps short color names to color specifications. One entry per
//! line:
//!
//! ```text
//! ; comment
//! water = #3f76e4
//! rail  = silver   ; trailing comments are allowed
//! ```
//!
//! A specification is either `#` followed by at least three hex digits, or
//! an alphanumeric token at least four characters long. Names are ASCII
//! alphanumeric and must be unique within the file.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParseError;

/// Minimum number of hex digits after `#`.
const MIN_HEX_DIGITS: usize = 3;

/// Minimum length of a named (non-`#`) color token.
const MIN_NAMED_LEN: usize = 4;

/// A validated color specification, e.g. `#00f` or `silver`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ColorSpec(String);

impl ColorSpec {
    /// Validate a raw token as a color specification.
    ///
    /// Returns `None` if the token is not exactly one well-formed spec.
    pub fn parse(token: &str) -> Option<Self> {
        match read_color_spec(token) {
            Ok((spec, "")) => Some(spec),
            _ => None,
        }
    }

    /// The specification text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A name to [`ColorSpec`] mapping loaded from a palette file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: BTreeMap<String, ColorSpec>,
}

impl Palette {
    /// Create an empty palette.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Look up a color by name.
    pub fn get(&self, name: &str) -> Option<&ColorSpec> {
        self.entries.get(name)
    }

    /// Number of defined colors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette defines no colors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, spec)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColorSpec)> {
        self.entries
            .iter()
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// Add an entry, rejecting names that are already defined.
    ///
    /// Returns the rejected spec back on a duplicate.
    pub fn insert(&mut self, name: &str, spec: ColorSpec) -> Result<(), ColorSpec> {
        if self.entries.contains_key(name) {
            return Err(spec);
        }
        self.entries.insert(name.to_owned(), spec);
        Ok(())
    }
}

/// Parse the full contents of a palette file.
///
/// Blank and comment-only lines are skipped. The first malformed line or
/// repeated name aborts the whole parse.
pub fn parse_palette(source: &str) -> Result<Palette, ParseError> {
    let mut palette = Palette::new();

    for (line, text) in (1_usize..).zip(source.lines()) {
        let Some((name, spec)) =
            read_color_def(text).map_err(|reason| ParseError::Syntax { line, reason })?
        else {
            continue;
        };

        if palette.insert(name, spec).is_err() {
            return Err(ParseError::DuplicateEntry {
                line,
                name: name.to_owned(),
            });
        }
    }

    Ok(palette)
}

/// Parse one palette line into a `(name, spec)` pair.
///
/// Returns `Ok(None)` for lines that are empty once the comment is removed.
pub(crate) fn read_color_def(line: &str) -> Result<Option<(&str, ColorSpec)>, &'static str> {
    let rest = skip_space(line);
    if rest.is_empty() {
        return Ok(None);
    }

    let (name, rest) = read_color_name(rest)?;

    let rest = skip_space(rest)
        .strip_prefix('=')
        .ok_or("expected `=` after color name")?;

    let rest = skip_space(rest);
    if rest.is_empty() {
        return Err("missing color specification");
    }

    let (spec, rest) = read_color_spec(rest)?;
    if !skip_space(rest).is_empty() {
        return Err("unexpected text after color specification");
    }

    Ok(Some((name, spec)))
}

/// Skip leading whitespace; a `;` swallows the rest of the line.
pub(crate) fn skip_space(s: &str) -> &str {
    let s = s.trim_start_matches([' ', '\t', '\r', '\n']);
    if s.starts_with(';') { "" } else { s }
}

/// Split `s` at the first character that does not satisfy `pred`.
fn take_while(s: &str, pred: impl Fn(char) -> bool) -> (&str, &str) {
    let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn read_color_name(s: &str) -> Result<(&str, &str), &'static str> {
    let (name, rest) = take_while(s, |c| c.is_ascii_alphanumeric());
    if name.is_empty() {
        return Err("color name must be alphanumeric");
    }
    Ok((name, rest))
}

fn read_color_spec(s: &str) -> Result<(ColorSpec, &str), &'static str> {
    if let Some(hex) = s.strip_prefix('#') {
        let (digits, rest) = take_while(hex, |c| c.is_ascii_hexdigit());
        if digits.len() < MIN_HEX_DIGITS {
            return Err("hex color needs at least three digits");
        }
        return Ok((ColorSpec(format!("#{digits}")), rest));
    }

    let (token, rest) = take_while(s, |c| c.is_ascii_alphanumeric());
    if token.len() < MIN_NAMED_LEN {
        return Err("named color must be at least four alphanumeric characters");
    }
    Ok((ColorSpec(token.to_owned()), rest))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn def(line: &str) -> (String, String) {
        let (name, spec) = read_color_def(line).unwrap().unwrap();
        (name.to_owned(), spec.as_str().to_owned())
    }

    #[test]
    fn reads_hex_definition() {
        assert_eq!(def("foo = #123456"), ("foo".into(), "#123456".into()));
    }

    #[test]
    fn reads_definition_with_trailing_comment() {
        assert_eq!(
            def("foo = #123456 ;this is a comment"),
            ("foo".into(), "#123456".into())
        );
        assert_eq!(def("foo=#123;x"), ("foo".into(), "#123".into()));
    }

    #[test]
    fn reads_named_definition() {
        assert_eq!(def("  rail\t=\tsilver  "), ("rail".into(), "silver".into()));
    }

    #[test]
    fn missing_equals_is_syntax_error() {
        assert!(read_color_def("foo #123456").is_err());
        assert!(read_color_def("foo").is_err());
        assert!(read_color_def("foo ;= #123").is_err());
    }

    #[test]
    fn second_equals_is_syntax_error() {
        assert!(read_color_def("foo = bar = #123456").is_err());
    }

    #[test]
    fn short_specs_are_rejected() {
        assert!(read_color_def("a = #12").is_err());
        assert!(read_color_def("a = red").is_err());
        assert!(read_color_def("a = #").is_err());
        assert!(read_color_def("a =").is_err());
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(read_color_def("a = #12g4").is_err());
        assert!(read_color_def("a = #123 x").is_err());
        assert!(read_color_def("a-b = #123").is_err());
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        assert!(read_color_def("").unwrap().is_none());
        assert!(read_color_def("   \t").unwrap().is_none());
        assert!(read_color_def("  ; only a comment").unwrap().is_none());
    }

    #[test]
    fn skip_space_stops_at_content_or_comment() {
        assert_eq!(skip_space("  a"), "a");
        assert_eq!(skip_space(" \t a"), "a");
        assert_eq!(skip_space("  ;a"), "");
        assert_eq!(skip_space(""), "");
    }

    #[test]
    fn parses_whole_file() {
        let source = "; palette\nblue = #00f\n\nrail = silver ; tracks\r\nred=#ff0000\n";
        let palette = parse_palette(source).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(palette.get("blue").unwrap().as_str(), "#00f");
        assert_eq!(palette.get("rail").unwrap().as_str(), "silver");
        assert_eq!(palette.get("red").unwrap().as_str(), "#ff0000");
        assert!(palette.get("green").is_none());
    }

    #[test]
    fn duplicate_name_fails_regardless_of_order() {
        for source in ["a=#111\na=#222", "a=#222\na=#111"] {
            let err = parse_palette(source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
            assert_eq!(err.line(), 2);
        }
    }

    #[test]
    fn insert_keeps_first_definition() {
        let mut palette = Palette::new();
        let first = ColorSpec::parse("#111").unwrap();
        let second = ColorSpec::parse("#222").unwrap();
        palette.insert("a", first).unwrap();
        let rejected = palette.insert("a", second);
        assert_eq!(rejected.unwrap_err().as_str(), "#222");
        assert_eq!(palette.get("a").unwrap().as_str(), "#111");
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn syntax_error_names_line() {
        let err = parse_palette("a = #111\n\nb #222\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn color_spec_validation() {
        assert!(ColorSpec::parse("#abc").is_some());
        assert!(ColorSpec::parse("white").is_some());
        assert!(ColorSpec::parse("#ab").is_none());
        assert!(ColorSpec::parse("abc").is_none());
        assert!(ColorSpec::parse("#abcx").is_none());
    }
}
