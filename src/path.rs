//! Delimited field paths.
//!
//! A field key such as `"data.user.address"` names a location in a nested
//! JSON object. [`Path`] holds its segments; every segment but the last
//! names a container, the last one is the leaf key inside it.

use crate::options::KeyOptions;
use std::fmt;

/// An ordered, non-empty list of key segments.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::{KeyOptions, Path};
///
/// let path = Path::parse("inner.details.description", &KeyOptions::new());
/// assert_eq!(path.segments(), ["inner", "details", "description"]);
/// assert_eq!(path.leaf(), "description");
///
/// // Splitting the empty key still yields one segment
/// assert_eq!(Path::parse("", &KeyOptions::new()).segments(), [""]);
///
/// // No delimiter, no splitting
/// let literal = Path::parse("a.b", &KeyOptions::new().without_delimiter());
/// assert_eq!(literal.segments(), ["a.b"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Splits `raw` on the delimiter of `options`.
    #[must_use]
    pub fn parse(raw: &str, options: &KeyOptions) -> Self {
        let segments = match options.delimiter.as_char() {
            Some(delimiter) => raw.split(delimiter).map(str::to_string).collect(),
            None => vec![raw.to_string()],
        };
        Path { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; a parsed path has at least one segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    #[must_use]
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments naming the containers above the leaf.
    #[must_use]
    pub fn containers(&self) -> &[String] {
        match self.segments.split_last() {
            Some((_, containers)) => containers,
            None => &[],
        }
    }

    /// Drops the head segment, keeping at least one.
    #[must_use]
    pub fn without_first(mut self) -> Self {
        if self.segments.len() > 1 {
            self.segments.remove(0);
        }
        self
    }

    pub(crate) fn into_parts(mut self) -> (Vec<String>, String) {
        let leaf = self.segments.pop().unwrap_or_default();
        (self.segments, leaf)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
