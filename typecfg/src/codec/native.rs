//! Decoding of natively typed leaves (JSON and YAML).
//!
//! Both formats carry booleans, numbers, strings and sequences as distinct
//! node kinds. Integral targets are range-checked per width; floating
//! targets accept any number; chars must be one-character strings.

use crate::error::{Error, Result};
use crate::value::text::single_char;
use crate::value::{TypedValue, ValueTag};

/// A scalar node as seen by the decoder.
#[derive(Clone, Copy)]
pub(crate) enum Scalar<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a str),
    /// A node kind that never decodes to a scalar (sequence, mapping).
    Other(&'static str),
}

/// Access to a parsed node of a natively typed format.
pub(crate) trait NativeNode: Sized {
    fn scalar(&self) -> Scalar<'_>;
    fn elements(&self) -> Option<&[Self]>;
    fn render(&self) -> String;
}

/// Decodes `node` as a value carrying `tag`.
pub(crate) fn decode<N: NativeNode>(key: &str, tag: ValueTag, node: &N) -> Result<TypedValue> {
    if !tag.is_array() {
        return decode_scalar(key, tag, node);
    }

    let elements = node
        .elements()
        .ok_or_else(|| malformed(key, tag, node, "expected an array"))?;
    let element_tag = tag.element();
    let mut array = TypedValue::empty_array(tag);
    for element in elements {
        let value = decode_scalar(key, element_tag, element).map_err(|e| match e {
            Error::MalformedProperty { reason, value, .. } => Error::MalformedProperty {
                key: key.to_string(),
                expected: tag,
                value,
                reason: format!("array element: {reason}"),
            },
            other => other,
        })?;
        array.push_element(value);
    }
    Ok(array)
}

fn decode_scalar<N: NativeNode>(key: &str, tag: ValueTag, node: &N) -> Result<TypedValue> {
    let fail = |reason: &str| malformed(key, tag, node, reason);
    let scalar = node.scalar();

    if let Scalar::Null = scalar {
        return Err(fail("null value"));
    }
    if let Scalar::Other(kind) = scalar {
        return Err(fail(&format!("expected a scalar, found {kind}")));
    }

    match tag {
        ValueTag::Bool => match scalar {
            Scalar::Bool(b) => Ok(TypedValue::Bool(b)),
            _ => Err(fail("expected a boolean")),
        },
        ValueTag::Byte | ValueTag::Short | ValueTag::Int | ValueTag::Long => {
            let wide = match scalar {
                Scalar::Int(i) => i,
                Scalar::UInt(u) => {
                    i64::try_from(u).map_err(|_| fail(&format!("out of {tag} range")))?
                }
                Scalar::Float(_) => return Err(fail("expected an integer")),
                _ => return Err(fail("expected a number")),
            };
            narrow(tag, wide).ok_or_else(|| fail(&format!("out of {tag} range")))
        }
        ValueTag::Float | ValueTag::Double => {
            let wide = match scalar {
                Scalar::Int(i) => i as f64,
                Scalar::UInt(u) => u as f64,
                Scalar::Float(f) => f,
                _ => return Err(fail("expected a number")),
            };
            if tag == ValueTag::Double {
                return Ok(TypedValue::Double(wide));
            }
            // the short form of f32::MAX lies just above it in f64
            let narrowed = wide as f32;
            if wide.is_finite() && narrowed.is_infinite() {
                return Err(fail("out of float range"));
            }
            Ok(TypedValue::Float(narrowed))
        }
        ValueTag::Char => match scalar {
            Scalar::Str(s) => single_char(s)
                .map(TypedValue::Char)
                .map_err(|e| fail(&e.reason)),
            _ => Err(fail("expected a one-character string")),
        },
        ValueTag::String => match scalar {
            Scalar::Str(s) => Ok(TypedValue::String(s.to_string())),
            _ => Err(fail("expected a string")),
        },
        array => Err(fail(&format!("{array} is not a scalar type"))),
    }
}

fn narrow(tag: ValueTag, wide: i64) -> Option<TypedValue> {
    match tag {
        ValueTag::Byte => i8::try_from(wide).ok().map(TypedValue::Byte),
        ValueTag::Short => i16::try_from(wide).ok().map(TypedValue::Short),
        ValueTag::Int => i32::try_from(wide).ok().map(TypedValue::Int),
        ValueTag::Long => Some(TypedValue::Long(wide)),
        _ => None,
    }
}

fn malformed<N: NativeNode>(key: &str, tag: ValueTag, node: &N, reason: &str) -> Error {
    Error::MalformedProperty {
        key: key.to_string(),
        expected: tag,
        value: node.render(),
        reason: reason.to_string(),
    }
}

/// Widens an `f32` through its shortest text so `1.1f32` encodes as `1.1`.
///
/// Falls back to the exact widening whenever the short form would not
/// narrow back to the same `f32`.
pub(crate) fn widen_float(value: f32) -> f64 {
    let exact = f64::from(value);
    match format!("{value:?}").parse::<f64>() {
        Ok(short) if short as f32 == value => short,
        _ => exact,
    }
}
