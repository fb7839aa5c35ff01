//! YAML codec.
//!
//! Same shape as the JSON layout, written as a block mapping:
//!
//! ```yaml
//! name: app
//! version: '1.0'
//! properties:
//! - lang: EN
//!   description: Interface language
//! - ports:
//!   - 8080
//!   - 8081
//!   description: null
//! ```
//!
//! Unlike JSON, YAML carries `.nan` and `.inf`, so non-finite floats
//! survive a round trip.

use serde_yaml::{Mapping, Number, Value};

use super::native::{self, NativeNode, Scalar};
use super::reconcile::reconcile;
use super::{check_identity, require_identity, Decoder, Encoder, Format, LoadedValues, DESCRIPTION};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::{IoOptions, ReadPolicy};
use crate::value::TypedValue;

/// Reads and writes the YAML layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Encoder for YamlCodec {
    fn encode(&self, config: &Configuration, _options: &IoOptions) -> Result<String> {
        let (name, version) = require_identity(config)?;

        let mut properties = Vec::with_capacity(config.len());
        for property in config.properties() {
            if property.key() == DESCRIPTION {
                return Err(Error::Encode {
                    key: DESCRIPTION.to_string(),
                    reason: "'description' is reserved by the YAML layout".into(),
                });
            }
            let mut leaf = Mapping::new();
            leaf.insert(property.key().into(), encode_value(property.value()));
            leaf.insert(
                DESCRIPTION.into(),
                property.description().map_or(Value::Null, Value::from),
            );
            properties.push(Value::Mapping(leaf));
        }

        let mut root = Mapping::new();
        root.insert("name".into(), name.into());
        root.insert("version".into(), version.into());
        root.insert("properties".into(), Value::Sequence(properties));

        serde_yaml::to_string(&Value::Mapping(root)).map_err(|e| Error::Encode {
            key: String::new(),
            reason: format!("failed to serialize to YAML: {e}"),
        })
    }
}

impl Decoder for YamlCodec {
    fn decode(
        &self,
        config: &Configuration,
        input: &str,
        policy: ReadPolicy,
    ) -> Result<LoadedValues> {
        let root: Value = serde_yaml::from_str(input).map_err(|e| Error::parse(Format::Yaml, e))?;
        if !root.is_mapping() {
            return Err(Error::parse(Format::Yaml, "top-level node must be a mapping"));
        }

        let name = root
            .get("name")
            .and_then(|v| header_text(v, config.name()));
        let version = root
            .get("version")
            .and_then(|v| header_text(v, config.version()));
        check_identity(config, name.as_deref(), version.as_deref())?;

        let entries = root
            .get("properties")
            .and_then(Value::as_sequence)
            .ok_or_else(|| Error::parse(Format::Yaml, "missing 'properties' sequence"))?;

        let mut leaves = Vec::with_capacity(entries.len());
        for entry in entries {
            leaves.push(split_leaf(entry)?);
        }

        reconcile(config, leaves, policy, |property, node| {
            native::decode(property.key(), property.tag(), node)
        })
    }
}

/// Reads a header field, accepting an unquoted `version: 1.0`.
///
/// An unquoted number loses its source text, so `1.10` arrives as `1.1`.
/// It matches `expected` whenever that text reads back as the same number.
fn header_text(value: &Value, expected: Option<&str>) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match expected {
            Some(text) if reads_as(text, n) => Some(text.to_string()),
            _ => Some(n.to_string()),
        },
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn reads_as(text: &str, number: &Number) -> bool {
    serde_yaml::from_str::<Number>(text).is_ok_and(|parsed| parsed == *number)
}

fn split_leaf(entry: &Value) -> Result<(String, Value)> {
    let mapping = entry
        .as_mapping()
        .ok_or_else(|| Error::parse(Format::Yaml, "property entry must be a mapping"))?;

    let mut key_value = None;
    for (name, value) in mapping {
        let name = name
            .as_str()
            .ok_or_else(|| Error::parse(Format::Yaml, "property keys must be strings"))?;
        if name == DESCRIPTION {
            continue;
        }
        if let Some((first, _)) = &key_value {
            return Err(Error::parse(
                Format::Yaml,
                format!("property entry has several keys ('{first}', '{name}')"),
            ));
        }
        key_value = Some((name.to_string(), value.clone()));
    }
    key_value.ok_or_else(|| Error::parse(Format::Yaml, "property entry has no key"))
}

fn encode_value(value: &TypedValue) -> Value {
    match value {
        TypedValue::Bool(v) => Value::Bool(*v),
        TypedValue::Byte(v) => Value::from(*v),
        TypedValue::Short(v) => Value::from(*v),
        TypedValue::Int(v) => Value::from(*v),
        TypedValue::Long(v) => Value::from(*v),
        TypedValue::Float(v) => Value::from(native::widen_float(*v)),
        TypedValue::Double(v) => Value::from(*v),
        TypedValue::Char(v) => Value::String(v.to_string()),
        TypedValue::String(v) => Value::String(v.clone()),
        TypedValue::BoolArray(v) => v.iter().copied().map(Value::Bool).collect(),
        TypedValue::ByteArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::ShortArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::IntArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::LongArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::FloatArray(v) => v
            .iter()
            .map(|f| Value::from(native::widen_float(*f)))
            .collect(),
        TypedValue::DoubleArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::CharArray(v) => v.iter().map(|c| Value::String(c.to_string())).collect(),
        TypedValue::StringArray(v) => v.iter().cloned().map(Value::String).collect(),
    }
}

impl NativeNode for Value {
    fn scalar(&self) -> Scalar<'_> {
        match self {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Scalar::UInt(u)
                } else {
                    Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Scalar::Str(s),
            Value::Sequence(_) => Scalar::Other("a sequence"),
            Value::Mapping(_) => Scalar::Other("a mapping"),
            Value::Tagged(_) => Scalar::Other("a tagged node"),
        }
    }

    fn elements(&self) -> Option<&[Self]> {
        self.as_sequence().map(Vec::as_slice)
    }

    fn render(&self) -> String {
        serde_yaml::to_string(self)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{self:?}"))
    }
}
