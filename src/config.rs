//! Process-wide mapping defaults.
//!
//! [`KeyedConfig`] bundles the default [`KeyOptions`], the pretty-printing
//! flag, and the functions turning JSON text into a [`Value`] and back.
//! Every top-level entry point has a `_with` variant taking an explicit
//! config, which also reaches keyed types nested inside the value; the
//! others use [`KeyedConfig::global`].
//!
//! ```rust
//! use serde_keyed::{KeyOptions, KeyedConfig};
//!
//! let config = KeyedConfig::new()
//!     .with_key_options(KeyOptions::legacy())
//!     .with_pretty(true);
//! assert!(config.pretty);
//! ```

use crate::options::KeyOptions;
use crate::{Error, Result, Value};
use std::fmt;
use std::sync::OnceLock;

/// Parses input bytes into a value tree.
pub type DecodeFn = fn(&[u8]) -> Result<Value>;

/// Renders a value tree; the flag asks for pretty output.
pub type EncodeFn = fn(&Value, bool) -> Result<Vec<u8>>;

static GLOBAL: OnceLock<KeyedConfig> = OnceLock::new();

/// Defaults shared by every mapping call that is not given its own config.
#[derive(Clone)]
pub struct KeyedConfig {
    pub key_options: KeyOptions,
    pub pretty: bool,
    pub decoder: DecodeFn,
    pub encoder: EncodeFn,
}

impl Default for KeyedConfig {
    fn default() -> Self {
        KeyedConfig {
            key_options: KeyOptions::default(),
            pretty: false,
            decoder: decode_json,
            encoder: encode_json,
        }
    }
}

impl fmt::Debug for KeyedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedConfig")
            .field("key_options", &self.key_options)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}

impl KeyedConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key_options(mut self, key_options: KeyOptions) -> Self {
        self.key_options = key_options;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Replaces the function parsing input bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::{KeyedConfig, Result, Value};
    ///
    /// fn strict(input: &[u8]) -> Result<Value> {
    ///     Ok(serde_json::from_slice(input)?)
    /// }
    ///
    /// let config = KeyedConfig::new().with_decoder(strict);
    /// assert!((config.decoder)(b"domek").is_err());
    /// ```
    #[must_use]
    pub fn with_decoder(mut self, decoder: DecodeFn) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub fn with_encoder(mut self, encoder: EncodeFn) -> Self {
        self.encoder = encoder;
        self
    }

    /// Installs this config as the process-wide default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Custom`] if a config was already installed, or if
    /// [`KeyedConfig::global`] was already called and fixed the default.
    pub fn install(self) -> Result<()> {
        tracing::debug!(
            delimiter = ?self.key_options.delimiter,
            flatten = ?self.key_options.flatten,
            pretty = self.pretty,
            "installing global keyed config"
        );
        GLOBAL
            .set(self)
            .map_err(|_| Error::custom("global keyed config is already installed"))
    }

    /// Returns the installed config, or the default one if none was installed.
    pub fn global() -> &'static KeyedConfig {
        GLOBAL.get_or_init(KeyedConfig::default)
    }
}

/// Parses JSON text. Input that is not JSON and does not look like an object,
/// array or quoted string is taken as a bare string.
///
/// # Errors
///
/// Returns [`Error::Json`] for malformed objects, arrays and strings, and for
/// non-JSON input that is not valid UTF-8.
pub fn decode_json(input: &[u8]) -> Result<Value> {
    match serde_json::from_slice(input) {
        Ok(value) => Ok(value),
        Err(err) => match std::str::from_utf8(input).map(str::trim) {
            Ok(text) if !text.is_empty() && !text.starts_with(['{', '[', '"']) => {
                Ok(Value::String(text.to_string()))
            }
            _ => Err(Error::from(err)),
        },
    }
}

/// Renders JSON text, compact or pretty.
///
/// # Errors
///
/// Returns [`Error::Json`] if the value cannot be written, for example a
/// non-finite float.
pub fn encode_json(value: &Value, pretty: bool) -> Result<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_word_is_a_string() {
        assert_eq!(decode_json(b"domek").unwrap(), Value::from("domek"));
        assert_eq!(decode_json(b"3").unwrap(), Value::from(3));
        assert_eq!(decode_json(b"3.3").unwrap(), Value::from(3.3));
    }

    #[test]
    fn test_broken_containers_stay_errors() {
        assert!(matches!(decode_json(b"{\"a\":"), Err(Error::Json(_))));
        assert!(matches!(decode_json(b"[1,"), Err(Error::Json(_))));
        assert!(matches!(decode_json(b""), Err(Error::Json(_))));
    }

    #[test]
    fn test_encode_pretty() {
        let mut map = crate::Map::new();
        map.insert("a".to_string(), Value::from(1));
        let value = Value::Object(map);
        assert_eq!(encode_json(&value, false).unwrap(), b"{\"a\":1}");
        assert_eq!(encode_json(&value, true).unwrap(), b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_builder() {
        let config = KeyedConfig::new().with_pretty(true);
        assert!(config.pretty);
        assert_eq!(config.key_options, KeyOptions::default());
    }
}
