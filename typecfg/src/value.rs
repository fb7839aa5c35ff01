//! Runtime type-tagged values.
//!
//! A [`TypedValue`] holds exactly one primitive scalar or one homogeneous
//! primitive array. Its [`ValueTag`] is fixed by the variant chosen at
//! construction; [`TypedValue::set`] only accepts a replacement carrying the
//! same tag, so a property's declared type never drifts.
//!
//! # Examples
//!
//! ```
//! use typecfg::{TypedValue, ValueTag};
//!
//! let mut value = TypedValue::from(8080);
//! assert_eq!(value.tag(), ValueTag::Int);
//!
//! value.set_value(9090).unwrap();
//! assert_eq!(value.as_int().unwrap(), 9090);
//!
//! // A string cannot replace an int.
//! assert!(value.set_value("9090").is_err());
//! ```

use std::fmt;

use crate::error::{Error, Result};

pub mod text;

#[cfg(test)]
pub(crate) mod proptests;

pub use text::ParseValueError;

/// Discriminator identifying which primitive or array type a value holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// `bool`
    Bool,
    /// `i8`
    Byte,
    /// `i16`
    Short,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// `char`
    Char,
    /// `String`
    String,
    /// `Vec<bool>`
    BoolArray,
    /// `Vec<i8>`
    ByteArray,
    /// `Vec<i16>`
    ShortArray,
    /// `Vec<i32>`
    IntArray,
    /// `Vec<i64>`
    LongArray,
    /// `Vec<f32>`
    FloatArray,
    /// `Vec<f64>`
    DoubleArray,
    /// `Vec<char>`
    CharArray,
    /// `Vec<String>`
    StringArray,
}

impl ValueTag {
    /// Every tag, scalars first.
    pub const ALL: [Self; 18] = [
        Self::Bool,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Char,
        Self::String,
        Self::BoolArray,
        Self::ByteArray,
        Self::ShortArray,
        Self::IntArray,
        Self::LongArray,
        Self::FloatArray,
        Self::DoubleArray,
        Self::CharArray,
        Self::StringArray,
    ];

    /// Returns `true` for the array tags.
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::BoolArray
                | Self::ByteArray
                | Self::ShortArray
                | Self::IntArray
                | Self::LongArray
                | Self::FloatArray
                | Self::DoubleArray
                | Self::CharArray
                | Self::StringArray
        )
    }

    /// Returns the scalar tag of an array's elements, or `self` for scalars.
    ///
    /// # Examples
    ///
    /// ```
    /// use typecfg::ValueTag;
    ///
    /// assert_eq!(ValueTag::LongArray.element(), ValueTag::Long);
    /// assert_eq!(ValueTag::Char.element(), ValueTag::Char);
    /// ```
    #[must_use]
    pub const fn element(self) -> Self {
        match self {
            Self::BoolArray => Self::Bool,
            Self::ByteArray => Self::Byte,
            Self::ShortArray => Self::Short,
            Self::IntArray => Self::Int,
            Self::LongArray => Self::Long,
            Self::FloatArray => Self::Float,
            Self::DoubleArray => Self::Double,
            Self::CharArray => Self::Char,
            Self::StringArray => Self::String,
            scalar => scalar,
        }
    }

    /// Returns the array tag whose elements carry this tag, or `self` for arrays.
    #[must_use]
    pub const fn array(self) -> Self {
        match self {
            Self::Bool => Self::BoolArray,
            Self::Byte => Self::ByteArray,
            Self::Short => Self::ShortArray,
            Self::Int => Self::IntArray,
            Self::Long => Self::LongArray,
            Self::Float => Self::FloatArray,
            Self::Double => Self::DoubleArray,
            Self::Char => Self::CharArray,
            Self::String => Self::StringArray,
            array => array,
        }
    }

    /// Returns `true` if the (element) type is numeric.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating()
    }

    /// Returns `true` if the (element) type is `i8`, `i16`, `i32` or `i64`.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self.element(),
            Self::Byte | Self::Short | Self::Int | Self::Long
        )
    }

    /// Returns `true` if the (element) type is `f32` or `f64`.
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self.element(), Self::Float | Self::Double)
    }

    /// Returns `true` if the (element) type is `char` or `String`.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self.element(), Self::Char | Self::String)
    }

    /// Returns `true` if the (element) type is `bool`.
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self.element(), Self::Bool)
    }

    /// Returns the lowercase type name used in messages, e.g. `int[]`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "string",
            Self::BoolArray => "bool[]",
            Self::ByteArray => "byte[]",
            Self::ShortArray => "short[]",
            Self::IntArray => "int[]",
            Self::LongArray => "long[]",
            Self::FloatArray => "float[]",
            Self::DoubleArray => "double[]",
            Self::CharArray => "char[]",
            Self::StringArray => "string[]",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single primitive scalar or primitive array.
///
/// The variant is the tag. Arrays are never absent: an empty `Vec` is a
/// valid value distinct from a missing property.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// A boolean.
    Bool(bool),
    /// An 8-bit signed integer.
    Byte(i8),
    /// A 16-bit signed integer.
    Short(i16),
    /// A 32-bit signed integer.
    Int(i32),
    /// A 64-bit signed integer.
    Long(i64),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A single Unicode scalar value.
    Char(char),
    /// A UTF-8 string.
    String(String),
    /// Booleans.
    BoolArray(Vec<bool>),
    /// 8-bit signed integers.
    ByteArray(Vec<i8>),
    /// 16-bit signed integers.
    ShortArray(Vec<i16>),
    /// 32-bit signed integers.
    IntArray(Vec<i32>),
    /// 64-bit signed integers.
    LongArray(Vec<i64>),
    /// 32-bit floats.
    FloatArray(Vec<f32>),
    /// 64-bit floats.
    DoubleArray(Vec<f64>),
    /// Characters.
    CharArray(Vec<char>),
    /// Strings.
    StringArray(Vec<String>),
}

impl TypedValue {
    /// Infers a value from an optional raw input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeInference`] if `raw` is `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use typecfg::{TypedValue, ValueTag};
    ///
    /// let value = TypedValue::infer(Some(vec![1.5_f64, 2.5])).unwrap();
    /// assert_eq!(value.tag(), ValueTag::DoubleArray);
    ///
    /// assert!(TypedValue::infer(None::<i32>).is_err());
    /// ```
    pub fn infer<T: Into<Self>>(raw: Option<T>) -> Result<Self> {
        raw.map(Into::into).ok_or_else(|| Error::TypeInference {
            reason: "value is absent".into(),
        })
    }

    /// Creates a `bool` value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        Self::Bool(value)
    }

    /// Creates an `i8` value.
    #[must_use]
    pub const fn from_byte(value: i8) -> Self {
        Self::Byte(value)
    }

    /// Creates an `i16` value.
    #[must_use]
    pub const fn from_short(value: i16) -> Self {
        Self::Short(value)
    }

    /// Creates an `i32` value.
    #[must_use]
    pub const fn from_int(value: i32) -> Self {
        Self::Int(value)
    }

    /// Creates an `i64` value.
    #[must_use]
    pub const fn from_long(value: i64) -> Self {
        Self::Long(value)
    }

    /// Creates an `f32` value.
    #[must_use]
    pub const fn from_float(value: f32) -> Self {
        Self::Float(value)
    }

    /// Creates an `f64` value.
    #[must_use]
    pub const fn from_double(value: f64) -> Self {
        Self::Double(value)
    }

    /// Creates a `char` value.
    #[must_use]
    pub const fn from_char(value: char) -> Self {
        Self::Char(value)
    }

    /// Creates a `String` value.
    #[must_use]
    pub fn from_string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Creates an empty array of the given tag's element type.
    ///
    /// Scalar tags are promoted to their array tag.
    #[must_use]
    pub const fn empty_array(tag: ValueTag) -> Self {
        match tag.array() {
            ValueTag::BoolArray => Self::BoolArray(Vec::new()),
            ValueTag::ByteArray => Self::ByteArray(Vec::new()),
            ValueTag::ShortArray => Self::ShortArray(Vec::new()),
            ValueTag::IntArray => Self::IntArray(Vec::new()),
            ValueTag::LongArray => Self::LongArray(Vec::new()),
            ValueTag::FloatArray => Self::FloatArray(Vec::new()),
            ValueTag::DoubleArray => Self::DoubleArray(Vec::new()),
            ValueTag::CharArray => Self::CharArray(Vec::new()),
            _ => Self::StringArray(Vec::new()),
        }
    }

    /// Returns the value's tag.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Bool(_) => ValueTag::Bool,
            Self::Byte(_) => ValueTag::Byte,
            Self::Short(_) => ValueTag::Short,
            Self::Int(_) => ValueTag::Int,
            Self::Long(_) => ValueTag::Long,
            Self::Float(_) => ValueTag::Float,
            Self::Double(_) => ValueTag::Double,
            Self::Char(_) => ValueTag::Char,
            Self::String(_) => ValueTag::String,
            Self::BoolArray(_) => ValueTag::BoolArray,
            Self::ByteArray(_) => ValueTag::ByteArray,
            Self::ShortArray(_) => ValueTag::ShortArray,
            Self::IntArray(_) => ValueTag::IntArray,
            Self::LongArray(_) => ValueTag::LongArray,
            Self::FloatArray(_) => ValueTag::FloatArray,
            Self::DoubleArray(_) => ValueTag::DoubleArray,
            Self::CharArray(_) => ValueTag::CharArray,
            Self::StringArray(_) => ValueTag::StringArray,
        }
    }

    /// Returns `true` if the value holds an array.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.tag().is_array()
    }

    /// Returns `true` if the value (or its elements) is numeric.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.tag().is_numeric()
    }

    /// Returns `true` if the value (or its elements) is a `char` or `String`.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        self.tag().is_text()
    }

    /// Returns `true` if the value (or its elements) is a `bool`.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        self.tag().is_boolean()
    }

    /// Returns the number of elements for arrays, `None` for scalars.
    #[must_use]
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Self::BoolArray(v) => Some(v.len()),
            Self::ByteArray(v) => Some(v.len()),
            Self::ShortArray(v) => Some(v.len()),
            Self::IntArray(v) => Some(v.len()),
            Self::LongArray(v) => Some(v.len()),
            Self::FloatArray(v) => Some(v.len()),
            Self::DoubleArray(v) => Some(v.len()),
            Self::CharArray(v) => Some(v.len()),
            Self::StringArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Appends a scalar to an array of the matching element type.
    ///
    /// Returns `false` (and drops `element`) if the kinds do not agree.
    pub(crate) fn push_element(&mut self, element: Self) -> bool {
        match (self, element) {
            (Self::BoolArray(v), Self::Bool(e)) => v.push(e),
            (Self::ByteArray(v), Self::Byte(e)) => v.push(e),
            (Self::ShortArray(v), Self::Short(e)) => v.push(e),
            (Self::IntArray(v), Self::Int(e)) => v.push(e),
            (Self::LongArray(v), Self::Long(e)) => v.push(e),
            (Self::FloatArray(v), Self::Float(e)) => v.push(e),
            (Self::DoubleArray(v), Self::Double(e)) => v.push(e),
            (Self::CharArray(v), Self::Char(e)) => v.push(e),
            (Self::StringArray(v), Self::String(e)) => v.push(e),
            _ => return false,
        }
        true
    }

    /// Replaces this value with `other` if both carry the same tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the tags differ; `self` is left
    /// untouched in that case.
    pub fn set(&mut self, other: Self) -> Result<()> {
        if self.tag() != other.tag() {
            return Err(Error::TypeMismatch {
                expected: self.tag(),
                found: other.tag(),
            });
        }
        *self = other;
        Ok(())
    }

    /// Converts `raw` and replaces this value with it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `raw` converts to a different tag.
    pub fn set_value(&mut self, raw: impl Into<Self>) -> Result<()> {
        self.set(raw.into())
    }

    fn cast_error(&self, requested: ValueTag) -> Error {
        Error::InvalidCast {
            requested,
            actual: self.tag(),
        }
    }

    /// Borrows the string payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCast`] unless the value is a `String`.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::String(v) => Ok(v),
            _ => Err(self.cast_error(ValueTag::String)),
        }
    }

    /// Borrows the string array payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCast`] unless the value is a `String` array.
    pub fn as_string_array(&self) -> Result<&[String]> {
        match self {
            Self::StringArray(v) => Ok(v),
            _ => Err(self.cast_error(ValueTag::StringArray)),
        }
    }

    /// Returns `true` if the value is a `String`.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns `true` if the value is a `String` array.
    #[must_use]
    pub const fn is_string_array(&self) -> bool {
        matches!(self, Self::StringArray(_))
    }
}

macro_rules! copy_accessors {
    ($(
        $scalar:ident, $array:ident, $ty:ty,
        $is:ident, $as:ident, $is_array:ident, $as_array:ident;
    )*) => {
        impl TypedValue {
            $(
                #[doc = concat!("Returns `true` if the value is a scalar `", stringify!($ty), "`.")]
                #[must_use]
                pub const fn $is(&self) -> bool {
                    matches!(self, Self::$scalar(_))
                }

                #[doc = concat!("Returns `true` if the value is a `", stringify!($ty), "` array.")]
                #[must_use]
                pub const fn $is_array(&self) -> bool {
                    matches!(self, Self::$array(_))
                }

                #[doc = concat!("Returns the `", stringify!($ty), "` payload.")]
                ///
                /// # Errors
                ///
                /// Returns [`Error::InvalidCast`] for any other tag; there is
                /// no implicit widening or narrowing.
                pub fn $as(&self) -> Result<$ty> {
                    match self {
                        Self::$scalar(v) => Ok(*v),
                        _ => Err(self.cast_error(ValueTag::$scalar)),
                    }
                }

                #[doc = concat!("Borrows the `", stringify!($ty), "` array payload.")]
                ///
                /// # Errors
                ///
                /// Returns [`Error::InvalidCast`] for any other tag.
                pub fn $as_array(&self) -> Result<&[$ty]> {
                    match self {
                        Self::$array(v) => Ok(v),
                        _ => Err(self.cast_error(ValueTag::$array)),
                    }
                }
            )*
        }

        $(
            impl From<$ty> for TypedValue {
                fn from(value: $ty) -> Self {
                    Self::$scalar(value)
                }
            }

            impl From<Vec<$ty>> for TypedValue {
                fn from(value: Vec<$ty>) -> Self {
                    Self::$array(value)
                }
            }

            impl From<&[$ty]> for TypedValue {
                fn from(value: &[$ty]) -> Self {
                    Self::$array(value.to_vec())
                }
            }
        )*
    };
}

copy_accessors! {
    Bool, BoolArray, bool, is_bool, as_bool, is_bool_array, as_bool_array;
    Byte, ByteArray, i8, is_byte, as_byte, is_byte_array, as_byte_array;
    Short, ShortArray, i16, is_short, as_short, is_short_array, as_short_array;
    Int, IntArray, i32, is_int, as_int, is_int_array, as_int_array;
    Long, LongArray, i64, is_long, as_long, is_long_array, as_long_array;
    Float, FloatArray, f32, is_float, as_float, is_float_array, as_float_array;
    Double, DoubleArray, f64, is_double, as_double, is_double_array, as_double_array;
    Char, CharArray, char, is_char, as_char, is_char_array, as_char_array;
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<String>> for TypedValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringArray(value)
    }
}

impl From<Vec<&str>> for TypedValue {
    fn from(value: Vec<&str>) -> Self {
        Self::StringArray(value.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
