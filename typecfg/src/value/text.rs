//! Canonical text form of typed values.
//!
//! Scalars render locale-independently: integers in decimal, floats in
//! their shortest round-trip form (`1.5`, `1e300`, `NaN`, `inf`), booleans
//! as `true`/`false`, chars and strings verbatim. Arrays render as
//! `[e1,e2,...]` with string and char elements double-quoted, so that
//! `TypedValue::parse_text(tag, &value.to_text())` restores every value,
//! including empty strings and strings containing `,` or `]`.

use std::fmt;
use std::num::IntErrorKind;

use super::{TypedValue, ValueTag};
use crate::error::Error;

/// Error returned when text cannot be read as a given tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseValueError {
    /// The tag the text was read as.
    pub tag: ValueTag,
    /// The offending text.
    pub text: String,
    /// Why the text was rejected.
    pub reason: String,
}

impl ParseValueError {
    pub(crate) fn new(tag: ValueTag, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Attaches a property key, producing [`Error::MalformedProperty`].
    #[must_use]
    pub fn into_malformed(self, key: &str) -> Error {
        Error::MalformedProperty {
            key: key.to_string(),
            expected: self.tag,
            value: self.text,
            reason: self.reason,
        }
    }
}

impl fmt::Display for ParseValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read '{}' as {}: {}", self.text, self.tag, self.reason)
    }
}

impl std::error::Error for ParseValueError {}

type ParseResult<T> = std::result::Result<T, ParseValueError>;

impl TypedValue {
    /// Renders the value in canonical text form.
    ///
    /// # Examples
    ///
    /// ```
    /// use typecfg::TypedValue;
    ///
    /// assert_eq!(TypedValue::from(-12_i16).to_text(), "-12");
    /// assert_eq!(TypedValue::from(vec![1_i32, 2, 3]).to_text(), "[1,2,3]");
    /// assert_eq!(TypedValue::from(vec!["a,b", ""]).to_text(), r#"["a,b",""]"#);
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::BoolArray(v) => join(v.iter().map(ToString::to_string)),
            Self::ByteArray(v) => join(v.iter().map(ToString::to_string)),
            Self::ShortArray(v) => join(v.iter().map(ToString::to_string)),
            Self::IntArray(v) => join(v.iter().map(ToString::to_string)),
            Self::LongArray(v) => join(v.iter().map(ToString::to_string)),
            Self::FloatArray(v) => join(v.iter().map(|f| format!("{f:?}"))),
            Self::DoubleArray(v) => join(v.iter().map(|f| format!("{f:?}"))),
            Self::CharArray(v) => join(v.iter().map(|c| quote(&c.to_string()))),
            Self::StringArray(v) => join(v.iter().map(|s| quote(s))),
            scalar => scalar_text(scalar),
        }
    }

    /// Renders each element in canonical text form, unquoted.
    ///
    /// Scalars yield a single-element vector.
    #[must_use]
    pub fn to_text_array(&self) -> Vec<String> {
        match self {
            Self::BoolArray(v) => v.iter().map(ToString::to_string).collect(),
            Self::ByteArray(v) => v.iter().map(ToString::to_string).collect(),
            Self::ShortArray(v) => v.iter().map(ToString::to_string).collect(),
            Self::IntArray(v) => v.iter().map(ToString::to_string).collect(),
            Self::LongArray(v) => v.iter().map(ToString::to_string).collect(),
            Self::FloatArray(v) => v.iter().map(|f| format!("{f:?}")).collect(),
            Self::DoubleArray(v) => v.iter().map(|f| format!("{f:?}")).collect(),
            Self::CharArray(v) => v.iter().map(ToString::to_string).collect(),
            Self::StringArray(v) => v.clone(),
            scalar => vec![scalar_text(scalar)],
        }
    }

    /// Reads canonical text as a value of `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseValueError`] when the text is not a valid `tag`
    /// literal, including integers outside the target width and
    /// multi-character text read as `char`.
    ///
    /// # Examples
    ///
    /// ```
    /// use typecfg::{TypedValue, ValueTag};
    ///
    /// let value = TypedValue::parse_text(ValueTag::ByteArray, "[1,-2]").unwrap();
    /// assert_eq!(value.as_byte_array().unwrap(), &[1, -2]);
    ///
    /// assert!(TypedValue::parse_text(ValueTag::Byte, "200").is_err());
    /// ```
    pub fn parse_text(tag: ValueTag, text: &str) -> ParseResult<Self> {
        if tag.is_array() {
            let elements = split_array(tag, text)?;
            Self::from_text_array(tag, &elements)
        } else {
            parse_scalar(tag, text)
        }
    }

    /// Builds a value of `tag` from unquoted element texts.
    ///
    /// For a scalar `tag`, exactly one element is required.
    ///
    /// # Errors
    ///
    /// Returns [`ParseValueError`] if any element fails to parse, or if a
    /// scalar tag is given anything but one element.
    pub fn from_text_array<S: AsRef<str>>(tag: ValueTag, elements: &[S]) -> ParseResult<Self> {
        if !tag.is_array() {
            return match elements {
                [single] => parse_scalar(tag, single.as_ref()),
                _ => Err(ParseValueError::new(
                    tag,
                    format!("{} elements", elements.len()),
                    "expected a single value",
                )),
            };
        }

        let element_tag = tag.element();
        let parsed = elements
            .iter()
            .map(|e| parse_scalar(element_tag, e.as_ref()))
            .collect::<ParseResult<Vec<_>>>()?;
        Ok(collect_array(tag, parsed))
    }
}

fn scalar_text(value: &TypedValue) -> String {
    match value {
        TypedValue::Bool(v) => v.to_string(),
        TypedValue::Byte(v) => v.to_string(),
        TypedValue::Short(v) => v.to_string(),
        TypedValue::Int(v) => v.to_string(),
        TypedValue::Long(v) => v.to_string(),
        TypedValue::Float(v) => format!("{v:?}"),
        TypedValue::Double(v) => format!("{v:?}"),
        TypedValue::Char(v) => v.to_string(),
        TypedValue::String(v) => v.clone(),
        array => array.to_text(),
    }
}

fn join(elements: impl Iterator<Item = String>) -> String {
    let mut out = String::from("[");
    for (i, element) in elements.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&element);
    }
    out.push(']');
    out
}

fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Splits `[a,"b",c]` into its unquoted elements.
fn split_array(tag: ValueTag, text: &str) -> ParseResult<Vec<String>> {
    let fail = |reason: &str| ParseValueError::new(tag, text, reason);

    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| fail("array must be enclosed in brackets"))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut elements = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut element = String::new();
        if chars.next_if_eq(&'"').is_some() {
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => element.push(chars.next().ok_or_else(|| fail("dangling escape"))?),
                    '"' => {
                        closed = true;
                        break;
                    }
                    other => element.push(other),
                }
            }
            if !closed {
                return Err(fail("unterminated quoted element"));
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if !matches!(chars.peek(), None | Some(',')) {
                return Err(fail("unexpected text after quoted element"));
            }
        } else {
            while let Some(c) = chars.next_if(|c| *c != ',') {
                element.push(c);
            }
            element = element.trim_end().to_string();
        }
        elements.push(element);

        if chars.next().is_none() {
            break;
        }
    }
    Ok(elements)
}

fn parse_scalar(tag: ValueTag, text: &str) -> ParseResult<TypedValue> {
    let trimmed = text.trim();
    let value = match tag {
        ValueTag::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                TypedValue::Bool(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                TypedValue::Bool(false)
            } else {
                return Err(ParseValueError::new(tag, text, "not a boolean"));
            }
        }
        ValueTag::Byte => TypedValue::Byte(trimmed.parse().map_err(|e| int_error(tag, text, &e))?),
        ValueTag::Short => {
            TypedValue::Short(trimmed.parse().map_err(|e| int_error(tag, text, &e))?)
        }
        ValueTag::Int => TypedValue::Int(trimmed.parse().map_err(|e| int_error(tag, text, &e))?),
        ValueTag::Long => TypedValue::Long(trimmed.parse().map_err(|e| int_error(tag, text, &e))?),
        ValueTag::Float => {
            let v: f32 = trimmed
                .parse()
                .map_err(|_| ParseValueError::new(tag, text, "not a number"))?;
            if v.is_infinite() && !is_infinity_literal(trimmed) {
                return Err(ParseValueError::new(tag, text, "out of float range"));
            }
            TypedValue::Float(v)
        }
        ValueTag::Double => {
            let v: f64 = trimmed
                .parse()
                .map_err(|_| ParseValueError::new(tag, text, "not a number"))?;
            if v.is_infinite() && !is_infinity_literal(trimmed) {
                return Err(ParseValueError::new(tag, text, "out of double range"));
            }
            TypedValue::Double(v)
        }
        ValueTag::Char => TypedValue::Char(single_char(text)?),
        ValueTag::String => TypedValue::String(text.to_string()),
        array => {
            return Err(ParseValueError::new(
                array,
                text,
                "expected a scalar tag",
            ))
        }
    };
    Ok(value)
}

pub(crate) fn single_char(text: &str) -> ParseResult<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        (None, _) => Err(ParseValueError::new(ValueTag::Char, text, "empty char")),
        (Some(_), Some(_)) => Err(ParseValueError::new(
            ValueTag::Char,
            text,
            "more than one character",
        )),
    }
}

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn int_error(tag: ValueTag, text: &str, err: &std::num::ParseIntError) -> ParseValueError {
    let reason = match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => format!("out of {tag} range"),
        IntErrorKind::Empty => "empty value".to_string(),
        _ => format!("not a valid {tag}"),
    };
    ParseValueError::new(tag, text, reason)
}

fn collect_array(tag: ValueTag, elements: Vec<TypedValue>) -> TypedValue {
    let mut array = TypedValue::empty_array(tag);
    for element in elements {
        array.push_element(element);
    }
    array
}
