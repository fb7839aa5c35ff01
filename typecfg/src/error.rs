//! Error types for the typecfg library.
//!
//! This module provides the error hierarchy for every operation in the
//! library, using `thiserror` for ergonomic error handling. Each variant
//! carries the offending key, value, or tag so callers can react precisely.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::Format;
use crate::value::ValueTag;

/// Result type alias for operations that may fail with a typecfg error.
///
/// # Examples
///
/// ```
/// use typecfg::{Error, Result};
///
/// fn example_operation() -> Result<i32> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the typecfg library.
#[derive(Debug, Error)]
pub enum Error {
    /// A value's type could not be inferred (the raw input was absent).
    #[error("cannot infer value type: {reason}")]
    TypeInference {
        /// Why inference failed.
        reason: String,
    },

    /// A value of one type was assigned to a slot of another type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The tag fixed for the slot.
        expected: ValueTag,
        /// The tag of the rejected value.
        found: ValueTag,
    },

    /// A typed accessor was called for a type the value does not hold.
    #[error("invalid cast: requested {requested}, value holds {actual}")]
    InvalidCast {
        /// The tag the caller asked for.
        requested: ValueTag,
        /// The tag the value actually holds.
        actual: ValueTag,
    },

    /// A property key was inserted twice into the same configuration.
    #[error("duplicate key '{key}'")]
    DuplicateKey {
        /// The key already present.
        key: String,
    },

    /// A property key is not acceptable (empty or blank).
    #[error("invalid key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// The reason the key is invalid.
        reason: String,
    },

    /// No property exists for the requested key.
    #[error("property not found: {key}")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// A builder was asked to build without a required field.
    #[error("cannot build {target}: missing {field}")]
    IncompleteBuilder {
        /// What was being built.
        target: &'static str,
        /// The field that was never set.
        field: &'static str,
    },

    /// The file content is not syntactically valid for its format.
    #[error("{format} parse error: {message}")]
    Parse {
        /// The format being parsed.
        format: Format,
        /// The underlying parser message.
        message: String,
    },

    /// The file header names a different configuration or version.
    #[error("configuration {field} mismatch: expected '{expected}', found '{found}'")]
    IdentityMismatch {
        /// Which identifier differed (`name` or `version`).
        field: &'static str,
        /// The schema's value.
        expected: String,
        /// The file's value.
        found: String,
    },

    /// Name or version is absent from the file header or from the schema.
    #[error("missing configuration identifiers: {missing}")]
    MissingConfigurationIdentifiers {
        /// Description of what is missing, and where.
        missing: String,
    },

    /// Strict policy: the file holds a key the schema does not declare.
    #[error("unknown property '{key}'")]
    UnknownProperty {
        /// The undeclared key.
        key: String,
    },

    /// Strict policy: a required schema key is absent from the file.
    #[error("missing property '{key}'")]
    MissingProperty {
        /// The absent key.
        key: String,
    },

    /// The same key appears more than once in the file.
    #[error("duplicate property '{key}' in file")]
    DuplicateProperty {
        /// The repeated key.
        key: String,
    },

    /// A value is present but cannot be decoded as the declared type.
    #[error("malformed property '{key}' (expected {expected}, got '{value}'): {reason}")]
    MalformedProperty {
        /// The property key.
        key: String,
        /// The declared tag.
        expected: ValueTag,
        /// The raw value as found in the file.
        value: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A value decoded but was rejected by the property's validator.
    #[error("invalid property '{key}': value '{value}' rejected by validator")]
    InvalidProperty {
        /// The property key.
        key: String,
        /// The rejected value in canonical text form.
        value: String,
    },

    /// A value cannot be represented in the target format.
    #[error("cannot encode property '{key}': {reason}")]
    Encode {
        /// The property key.
        key: String,
        /// Why encoding failed.
        reason: String,
    },

    /// An I/O error occurred on the configuration file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An asynchronous operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// The background worker could not be scheduled or panicked.
    #[error("background task failed: {message}")]
    Task {
        /// Details about the failure.
        message: String,
    },
}

impl Error {
    /// Builds an [`Error::Io`] for the given path.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds an [`Error::Parse`] from any displayable parser error.
    pub(crate) fn parse(format: Format, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            format,
            message: err.to_string(),
        }
    }

    /// Returns the property key this error refers to, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use typecfg::Error;
    ///
    /// let err = Error::MissingProperty { key: "lang".to_string() };
    /// assert_eq!(err.key(), Some("lang"));
    /// assert_eq!(Error::Cancelled.key(), None);
    /// ```
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::DuplicateKey { key }
            | Self::InvalidKey { key, .. }
            | Self::NotFound { key }
            | Self::UnknownProperty { key }
            | Self::MissingProperty { key }
            | Self::DuplicateProperty { key }
            | Self::MalformedProperty { key, .. }
            | Self::InvalidProperty { key, .. }
            | Self::Encode { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Check if error indicates the configuration file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use typecfg::Error;
    ///
    /// let err = Error::Io {
    ///     path: "/nonexistent.json".into(),
    ///     source: std::io::Error::from(std::io::ErrorKind::NotFound),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if error came from malformed file syntax.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_error() {
        let err = Error::TypeMismatch {
            expected: ValueTag::Int,
            found: ValueTag::String,
        };
        let display = format!("{err}");
        assert!(display.contains("type mismatch"));
        assert!(display.contains("int"));
        assert!(display.contains("string"));
    }

    #[test]
    fn test_malformed_property_error() {
        let err = Error::MalformedProperty {
            key: "level".to_string(),
            expected: ValueTag::Byte,
            value: "200".to_string(),
            reason: "out of byte range".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("level"));
        assert!(display.contains("200"));
        assert!(display.contains("out of byte range"));
        assert_eq!(err.key(), Some("level"));
    }

    #[test]
    fn test_identity_mismatch_error() {
        let err = Error::IdentityMismatch {
            field: "version",
            expected: "1.0".to_string(),
            found: "2.0".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("version mismatch"));
        assert!(display.contains("expected '1.0'"));
        assert!(display.contains("found '2.0'"));
    }

    #[test]
    fn test_parse_error_constructor() {
        let err = Error::parse(Format::Json, "unexpected end of input");
        assert!(err.is_parse_error());
        assert!(format!("{err}").starts_with("json parse error"));
    }

    #[test]
    fn test_io_error_not_found() {
        let err = Error::io(
            "/missing/app.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.is_not_found());
        let display = format!("{err}").replace(std::path::MAIN_SEPARATOR, "/");
        assert!(display.contains("/missing/app.json"));
    }

    #[test]
    fn test_io_error_other_kind() {
        let err = Error::io(
            "app.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_incomplete_builder_error() {
        let err = Error::IncompleteBuilder {
            target: "property",
            field: "value",
        };
        assert_eq!(format!("{err}"), "cannot build property: missing value");
    }

    #[test]
    fn test_key_absent_for_identity_errors() {
        let err = Error::MissingConfigurationIdentifiers {
            missing: "name".to_string(),
        };
        assert_eq!(err.key(), None);
    }
}
