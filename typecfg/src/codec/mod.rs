//! Format codecs.
//!
//! Each codec translates between a [`Configuration`] and one intermediate
//! tree (JSON value, XML element tree, YAML value, CSV records, delimited
//! text records). Writers walk the schema in order and encode every
//! property into a leaf; readers parse the input into leaves and hand them
//! to the shared reconciliation step, which applies the read policy and
//! decodes each matching leaf against the property's declared tag.
//!
//! Decoding never touches the configuration: it returns [`LoadedValues`]
//! that [`Configuration::commit`] applies in one step.
//!
//! # Examples
//!
//! ```
//! use typecfg::{Configuration, Format, IoOptions, PropertyDefinition, ReadPolicy};
//!
//! let mut builder = Configuration::builder();
//! builder.name("app").version("1").filename("app.json");
//! builder.put(PropertyDefinition::builder("port").value(8080).build().unwrap()).unwrap();
//! let mut config = builder.build().unwrap();
//!
//! let json = Format::Json.encode(&config, &IoOptions::default()).unwrap();
//! let edited = json.replace("8080", "9090");
//!
//! let loaded = Format::Json.decode(&config, &edited, ReadPolicy::Strict).unwrap();
//! config.commit(loaded).unwrap();
//! assert_eq!(config.value("port").unwrap().as_int().unwrap(), 9090);
//! ```

use std::fmt;
use std::path::Path;

use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::{IoOptions, ReadPolicy};
use crate::value::TypedValue;

pub mod csv;
pub mod json;
mod native;
mod reconcile;
pub mod text;
pub mod xml;
pub mod yaml;

#[cfg(test)]
mod proptests;

pub use self::csv::CsvCodec;
pub use self::json::JsonCodec;
pub use self::text::TextCodec;
pub use self::xml::XmlCodec;
pub use self::yaml::YamlCodec;

/// Serializes a configuration into one wire format.
pub trait Encoder {
    /// Encodes every property of `config`, in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfigurationIdentifiers`] when the format
    /// needs a header the configuration cannot provide, and
    /// [`Error::Encode`] when a value has no representation in the format.
    fn encode(&self, config: &Configuration, options: &IoOptions) -> Result<String>;
}

/// Parses one wire format and reconciles it against a schema.
pub trait Decoder {
    /// Decodes `input` against `config` under `policy`.
    ///
    /// # Errors
    ///
    /// Returns the parse, identity, reconciliation, decoding or validation
    /// error for the first fault found in schema order.
    fn decode(&self, config: &Configuration, input: &str, policy: ReadPolicy)
        -> Result<LoadedValues>;
}

/// A codec implements both directions.
pub trait Codec: Encoder + Decoder + Send + Sync {}

impl<T: Encoder + Decoder + Send + Sync> Codec for T {}

/// Supported serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// JSON document with a `properties` array.
    Json,
    /// XML document rooted at `<configuration>`.
    Xml,
    /// YAML block mapping mirroring the JSON layout.
    Yaml,
    /// CSV with one row per property.
    Csv,
    /// Delimited `key=value;` records.
    Text,
}

impl Format {
    /// Every format.
    pub const ALL: [Self; 5] = [Self::Json, Self::Xml, Self::Yaml, Self::Csv, Self::Text];

    /// Returns the codec for this format.
    #[must_use]
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Self::Json => &JsonCodec,
            Self::Xml => &XmlCodec,
            Self::Yaml => &YamlCodec,
            Self::Csv => &CsvCodec,
            Self::Text => &TextCodec,
        }
    }

    /// Returns the conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::Csv => "csv",
            Self::Text => "cfg",
        }
    }

    /// Picks a format from a file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use typecfg::Format;
    ///
    /// assert_eq!(Format::from_path(Path::new("app.yml")), Some(Format::Yaml));
    /// assert_eq!(Format::from_path(Path::new("app")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "yaml" | "yml" => Some(Self::Yaml),
            "csv" => Some(Self::Csv),
            "cfg" | "txt" | "properties" => Some(Self::Text),
            _ => None,
        }
    }

    /// Encodes `config` in this format.
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode`].
    pub fn encode(self, config: &Configuration, options: &IoOptions) -> Result<String> {
        self.codec().encode(config, options)
    }

    /// Decodes `input` in this format against `config`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode(
        self,
        config: &Configuration,
        input: &str,
        policy: ReadPolicy,
    ) -> Result<LoadedValues> {
        self.codec().decode(config, input, policy)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Xml => write!(f, "xml"),
            Self::Yaml => write!(f, "yaml"),
            Self::Csv => write!(f, "csv"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Values decoded from a file, not yet applied to the configuration.
///
/// Entries are in schema order and each carries the property's tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedValues {
    values: Vec<(String, TypedValue)>,
}

impl LoadedValues {
    pub(crate) fn push(&mut self, key: impl Into<String>, value: TypedValue) {
        self.values.push((key.into(), value));
    }

    /// Returns the number of decoded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the decoded value for `key`, if the file supplied one.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterates over decoded `(key, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for LoadedValues {
    type Item = (String, TypedValue);
    type IntoIter = std::vec::IntoIter<(String, TypedValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Returns the schema's name and version for header-carrying formats.
pub(crate) fn require_identity(config: &Configuration) -> Result<(&str, &str)> {
    match (config.name(), config.version()) {
        (Some(name), Some(version)) => Ok((name, version)),
        (None, _) => Err(Error::MissingConfigurationIdentifiers {
            missing: "configuration has no name".into(),
        }),
        (_, None) => Err(Error::MissingConfigurationIdentifiers {
            missing: "configuration has no version".into(),
        }),
    }
}

/// Compares a file header against the schema's identity.
pub(crate) fn check_identity(
    config: &Configuration,
    name: Option<&str>,
    version: Option<&str>,
) -> Result<()> {
    let (expected_name, expected_version) = require_identity(config)?;
    let name = name.ok_or_else(|| Error::MissingConfigurationIdentifiers {
        missing: "file header has no name".into(),
    })?;
    let version = version.ok_or_else(|| Error::MissingConfigurationIdentifiers {
        missing: "file header has no version".into(),
    })?;

    if name != expected_name {
        return Err(Error::IdentityMismatch {
            field: "name",
            expected: expected_name.to_string(),
            found: name.to_string(),
        });
    }
    if version != expected_version {
        return Err(Error::IdentityMismatch {
            field: "version",
            expected: expected_version.to_string(),
            found: version.to_string(),
        });
    }
    Ok(())
}

/// Property key reserved by the JSON and YAML leaf layout.
pub(crate) const DESCRIPTION: &str = "description";
