//! Error types for keyed decoding and encoding.
//!
//! Every error raised by the mapping engine carries the path of the field
//! that failed, written with the delimiter of that field (`inner.details`).
//!
//! ## Error Categories
//!
//! - **Path errors**: a key and its options cannot be turned into a path
//! - **Data errors**: a required key is missing or holds the wrong type
//! - **Transform errors**: a [`Transformer`](crate::Transformer) rejected a value
//! - **Invariant errors**: the container cache lost track of a parent container
//! - **I/O errors**: JSON text could not be read or written
//!
//! ## Examples
//!
//! ```rust
//! use serde_keyed::{from_str, Error};
//!
//! let result: Result<Vec<i32>, Error> = from_str("[1, \"two\"]");
//! assert!(result.is_err());
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur during keyed mapping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The key could not be split into a usable path.
    #[error("Invalid key path `{key}`: {reason}")]
    PathParseFailed { key: String, reason: String },

    /// A required key (or one of its parent objects) is absent.
    #[error("Missing required key `{path}`")]
    MissingRequiredKey { path: String },

    /// The value at `path` does not have the expected shape.
    #[error("Type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A transformer returned no value.
    #[error("Transform failed at `{path}`")]
    TransformFailed { path: String },

    /// The container cache was asked for a child whose parent was never resolved.
    #[error("No parent container cached for `{path}`")]
    MissingParentContainer { path: String },

    /// Malformed JSON text.
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a path parse error for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::Error;
    ///
    /// let err = Error::path_parse("* ", "prefix leaves an empty key");
    /// assert!(err.to_string().contains("empty key"));
    /// ```
    pub fn path_parse(key: &str, reason: &str) -> Self {
        Error::PathParseFailed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a missing key error.
    pub fn missing_key(path: &str) -> Self {
        Error::MissingRequiredKey {
            path: path.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::Error;
    ///
    /// let err = Error::type_mismatch("inner", "object", "string");
    /// assert!(err.to_string().contains("expected object"));
    /// ```
    pub fn type_mismatch(path: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn transform_failed(path: &str) -> Self {
        Error::TransformFailed {
            path: path.to_string(),
        }
    }

    pub fn missing_parent(path: &str) -> Self {
        Error::MissingParentContainer {
            path: path.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the field path this error refers to, if it has one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::MissingRequiredKey { path }
            | Error::TypeMismatch { path, .. }
            | Error::TransformFailed { path }
            | Error::MissingParentContainer { path } => Some(path),
            Error::PathParseFailed { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Anchors an error raised inside a field's value at that field's path.
    ///
    /// Serde reports missing struct fields and type mismatches relative to the
    /// value being decoded; this prefixes them with the field path so the
    /// caller sees the full location. Errors without a path are left as is.
    #[must_use]
    pub fn at(self, field: &str) -> Self {
        self.at_with(field, '.')
    }

    /// Like [`at`](Error::at), joining the two paths with `delimiter`.
    ///
    /// ```rust
    /// use serde_keyed::Error;
    ///
    /// let err = Error::missing_key("meta/name").at_with("data/inner", '/');
    /// assert_eq!(err, Error::missing_key("data/inner/meta/name"));
    /// ```
    #[must_use]
    pub fn at_with(self, field: &str, delimiter: char) -> Self {
        let join = |inner: String| {
            if inner.is_empty() {
                field.to_string()
            } else if field.is_empty() {
                inner
            } else {
                format!("{}{}{}", field, delimiter, inner)
            }
        };
        match self {
            Error::MissingRequiredKey { path } => Error::MissingRequiredKey { path: join(path) },
            Error::TypeMismatch {
                path,
                expected,
                found,
            } => Error::TypeMismatch {
                path: join(path),
                expected,
                found,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::TypeMismatch {
            path: String::new(),
            expected: exp.to_string(),
            found: unexp.to_string(),
        }
    }

    fn missing_field(field: &'static str) -> Self {
        Error::MissingRequiredKey {
            path: field.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else {
            Error::Json(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
