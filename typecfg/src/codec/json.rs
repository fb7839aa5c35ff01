//! JSON codec.
//!
//! Layout:
//!
//! ```json
//! {
//!   "name": "app",
//!   "version": "1.0",
//!   "properties": [
//!     { "lang": "EN", "description": "Interface language" },
//!     { "ports": [8080, 8081], "description": null }
//!   ]
//! }
//! ```
//!
//! Each property object holds its key as the single member besides
//! `description`. Numbers and booleans are native JSON values; chars and
//! strings are JSON strings.

use serde_json::{Map, Number, Value};

use super::native::{self, NativeNode, Scalar};
use super::reconcile::reconcile;
use super::{check_identity, require_identity, Decoder, Encoder, Format, LoadedValues, DESCRIPTION};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::{IoOptions, ReadPolicy};
use crate::value::TypedValue;

/// Reads and writes the JSON layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Encoder for JsonCodec {
    fn encode(&self, config: &Configuration, options: &IoOptions) -> Result<String> {
        let (name, version) = require_identity(config)?;

        let mut properties = Vec::with_capacity(config.len());
        for property in config.properties() {
            if property.key() == DESCRIPTION {
                return Err(reserved_key());
            }
            let mut leaf = Map::new();
            leaf.insert(
                property.key().to_string(),
                encode_value(property.key(), property.value())?,
            );
            leaf.insert(
                DESCRIPTION.to_string(),
                property
                    .description()
                    .map_or(Value::Null, |d| Value::String(d.to_string())),
            );
            properties.push(Value::Object(leaf));
        }

        let mut root = Map::new();
        root.insert("name".into(), Value::String(name.to_string()));
        root.insert("version".into(), Value::String(version.to_string()));
        root.insert("properties".into(), Value::Array(properties));
        let root = Value::Object(root);

        let rendered = if options.pretty {
            serde_json::to_string_pretty(&root)
        } else {
            serde_json::to_string(&root)
        };
        rendered.map_err(|e| Error::Encode {
            key: String::new(),
            reason: format!("failed to serialize to JSON: {e}"),
        })
    }
}

impl Decoder for JsonCodec {
    fn decode(
        &self,
        config: &Configuration,
        input: &str,
        policy: ReadPolicy,
    ) -> Result<LoadedValues> {
        let root: Value = serde_json::from_str(input).map_err(|e| Error::parse(Format::Json, e))?;
        let root = root
            .as_object()
            .ok_or_else(|| Error::parse(Format::Json, "top-level value must be an object"))?;

        check_identity(
            config,
            root.get("name").and_then(Value::as_str),
            root.get("version").and_then(Value::as_str),
        )?;

        let entries = root
            .get("properties")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::parse(Format::Json, "missing 'properties' array"))?;

        let mut leaves = Vec::with_capacity(entries.len());
        for entry in entries {
            leaves.push(split_leaf(entry)?);
        }

        reconcile(config, leaves, policy, |property, node| {
            native::decode(property.key(), property.tag(), node)
        })
    }
}

/// Extracts `(key, value)` from one property object.
fn split_leaf(entry: &Value) -> Result<(String, Value)> {
    let object = entry
        .as_object()
        .ok_or_else(|| Error::parse(Format::Json, "property entry must be an object"))?;

    let mut members = object.iter().filter(|(name, _)| name.as_str() != DESCRIPTION);
    match (members.next(), members.next()) {
        (Some((key, value)), None) => Ok((key.clone(), value.clone())),
        (None, _) => Err(Error::parse(Format::Json, "property entry has no key")),
        (Some((first, _)), Some((second, _))) => Err(Error::parse(
            Format::Json,
            format!("property entry has several keys ('{first}', '{second}')"),
        )),
    }
}

fn encode_value(key: &str, value: &TypedValue) -> Result<Value> {
    let encoded = match value {
        TypedValue::Bool(v) => Value::Bool(*v),
        TypedValue::Byte(v) => Value::from(*v),
        TypedValue::Short(v) => Value::from(*v),
        TypedValue::Int(v) => Value::from(*v),
        TypedValue::Long(v) => Value::from(*v),
        TypedValue::Float(v) => float(key, native::widen_float(*v))?,
        TypedValue::Double(v) => float(key, *v)?,
        TypedValue::Char(v) => Value::String(v.to_string()),
        TypedValue::String(v) => Value::String(v.clone()),
        TypedValue::BoolArray(v) => v.iter().copied().map(Value::Bool).collect(),
        TypedValue::ByteArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::ShortArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::IntArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::LongArray(v) => v.iter().copied().map(Value::from).collect(),
        TypedValue::FloatArray(v) => v
            .iter()
            .map(|f| float(key, native::widen_float(*f)))
            .collect::<Result<Vec<_>>>()?
            .into(),
        TypedValue::DoubleArray(v) => v
            .iter()
            .map(|f| float(key, *f))
            .collect::<Result<Vec<_>>>()?
            .into(),
        TypedValue::CharArray(v) => v.iter().map(|c| Value::String(c.to_string())).collect(),
        TypedValue::StringArray(v) => v.iter().cloned().map(Value::String).collect(),
    };
    Ok(encoded)
}

fn float(key: &str, value: f64) -> Result<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| Error::Encode {
            key: key.to_string(),
            reason: format!("JSON cannot represent {value}"),
        })
}

fn reserved_key() -> Error {
    Error::Encode {
        key: DESCRIPTION.to_string(),
        reason: "'description' is reserved by the JSON layout".into(),
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
            Value::Array(_) => Scalar::Other("an array"),
            Value::Object(_) => Scalar::Other("an object"),
        }
    }

    fn elements(&self) -> Option<&[Self]> {
        self.as_array().map(Vec::as_slice)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}
