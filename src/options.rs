//! Per-field key options.
//!
//! This module provides the types that control how a field key is turned
//! into a location in the JSON tree:
//!
//! - [`KeyOptions`]: Main configuration struct
//! - [`Delimiter`]: Character splitting a key into path segments, or none
//! - [`Flatten`]: Which keys mean "the current object itself"
//!
//! ## Examples
//!
//! ```rust
//! use serde_keyed::{KeyOptions, Flatten};
//!
//! // `inner+details` addresses {"inner": {"details": ...}}
//! let options = KeyOptions::new().with_delimiter('+');
//!
//! // Treat the key "_" as flat, and read tolerant arrays from keys
//! // starting with "* "
//! let options = KeyOptions::new()
//!     .with_flatten(Flatten::Exact("_".to_string()))
//!     .with_optional_array_prefix("* ");
//! assert!(options.is_flat("_"));
//! ```

use crate::path::Path;

/// Character used to split a key into path segments.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::Delimiter;
///
/// assert_eq!(Delimiter::default().as_char(), Some('.'));
/// assert_eq!(Delimiter::None.as_char(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// Keys are never split.
    None,
    Character(char),
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::Character('.')
    }
}

impl Delimiter {
    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Delimiter::None => None,
            Delimiter::Character(c) => Some(*c),
        }
    }
}

/// Marker selecting keys that address the current object instead of a child.
///
/// A flat field reads its whole value from the object being decoded, and on
/// encode merges its fields into that object.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::Flatten;
///
/// assert!(Flatten::EmptyOrBlank.matches(""));
/// assert!(Flatten::EmptyOrBlank.matches("  \t"));
/// assert!(!Flatten::EmptyOrBlank.matches("a"));
/// assert!(Flatten::Exact("_".to_string()).matches("_"));
/// assert!(!Flatten::None.matches(""));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Flatten {
    None,
    /// Empty or whitespace-only keys.
    #[default]
    EmptyOrBlank,
    Exact(String),
}

impl Flatten {
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Flatten::None => false,
            Flatten::EmptyOrBlank => key.trim().is_empty(),
            Flatten::Exact(marker) => key == marker,
        }
    }
}

/// Options controlling how one field's key maps onto the JSON tree.
///
/// The process-wide defaults live in [`KeyedConfig`](crate::KeyedConfig);
/// a mapping routine usually starts from
/// [`KeyMap::default_options`](crate::KeyMap::default_options) and
/// overrides what it needs.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::{KeyOptions, Delimiter, Flatten};
///
/// let options = KeyOptions::new();
/// assert_eq!(options.delimiter, Delimiter::Character('.'));
/// assert_eq!(options.flatten, Flatten::EmptyOrBlank);
/// assert_eq!(options.optional_array_prefix, None);
///
/// let legacy = KeyOptions::legacy();
/// assert_eq!(legacy.optional_array_prefix.as_deref(), Some("* "));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct KeyOptions {
    pub delimiter: Delimiter,
    pub flatten: Flatten,
    /// Leaf-key prefix marking an array whose malformed elements are dropped.
    pub optional_array_prefix: Option<String>,
}

impl KeyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the legacy defaults: `.` delimiter, blank keys flat, and
    /// tolerant arrays marked with a leading `"* "`.
    #[must_use]
    pub fn legacy() -> Self {
        KeyOptions {
            optional_array_prefix: Some("* ".to_string()),
            ..Default::default()
        }
    }

    /// Sets the character splitting keys into path segments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::{KeyOptions, Delimiter};
    ///
    /// let options = KeyOptions::new().with_delimiter('+');
    /// assert_eq!(options.delimiter, Delimiter::Character('+'));
    /// ```
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Delimiter::Character(delimiter);
        self
    }

    /// Disables path splitting: every key is a single literal segment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::{KeyOptions, Delimiter};
    ///
    /// let options = KeyOptions::new().without_delimiter();
    /// assert_eq!(options.delimiter, Delimiter::None);
    /// ```
    #[must_use]
    pub fn without_delimiter(mut self) -> Self {
        self.delimiter = Delimiter::None;
        self
    }

    #[must_use]
    pub fn with_flatten(mut self, flatten: Flatten) -> Self {
        self.flatten = flatten;
        self
    }

    /// Sets the leaf prefix marking tolerant arrays.
    ///
    /// An empty prefix turns the feature off.
    #[must_use]
    pub fn with_optional_array_prefix(mut self, prefix: &str) -> Self {
        self.optional_array_prefix = if prefix.is_empty() {
            None
        } else {
            Some(prefix.to_string())
        };
        self
    }

    #[must_use]
    pub fn without_optional_array_prefix(mut self) -> Self {
        self.optional_array_prefix = None;
        self
    }

    /// Returns `true` if the un-split key addresses the current object.
    #[must_use]
    pub fn is_flat(&self, key: &str) -> bool {
        self.flatten.matches(key)
    }

    /// Returns `true` if a multi-segment path starts with a flat segment,
    /// so that the rest of the path resolves against the current object.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::{KeyOptions, Path};
    ///
    /// let options = KeyOptions::new();
    /// assert!(options.is_first_segment_flat(&Path::parse(".name", &options)));
    /// assert!(!options.is_first_segment_flat(&Path::parse("", &options)));
    /// assert!(!options.is_first_segment_flat(&Path::parse("a.name", &options)));
    /// ```
    #[must_use]
    pub fn is_first_segment_flat(&self, path: &Path) -> bool {
        path.len() > 1 && path.first().is_some_and(|head| self.flatten.matches(head))
    }
}
