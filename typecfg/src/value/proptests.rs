//! Property-based tests for `TypedValue` text conversion and tag rules.

use super::{TypedValue, ValueTag};
use proptest::prelude::*;

// Strategy for generating finite doubles (NaN never compares equal)
fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

fn finite_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("finite", |v| v.is_finite())
}

/// Strategy producing a value of every tag.
pub(crate) fn typed_value_strategy() -> impl Strategy<Value = TypedValue> {
    prop_oneof![
        any::<bool>().prop_map(TypedValue::Bool),
        any::<i8>().prop_map(TypedValue::Byte),
        any::<i16>().prop_map(TypedValue::Short),
        any::<i32>().prop_map(TypedValue::Int),
        any::<i64>().prop_map(TypedValue::Long),
        finite_f32().prop_map(TypedValue::Float),
        finite_f64().prop_map(TypedValue::Double),
        any::<char>().prop_map(TypedValue::Char),
        any::<String>().prop_map(TypedValue::String),
        prop::collection::vec(any::<bool>(), 0..6).prop_map(TypedValue::BoolArray),
        prop::collection::vec(any::<i8>(), 0..6).prop_map(TypedValue::ByteArray),
        prop::collection::vec(any::<i16>(), 0..6).prop_map(TypedValue::ShortArray),
        prop::collection::vec(any::<i32>(), 0..6).prop_map(TypedValue::IntArray),
        prop::collection::vec(any::<i64>(), 0..6).prop_map(TypedValue::LongArray),
        prop::collection::vec(finite_f32(), 0..6).prop_map(TypedValue::FloatArray),
        prop::collection::vec(finite_f64(), 0..6).prop_map(TypedValue::DoubleArray),
        prop::collection::vec(any::<char>(), 0..6).prop_map(TypedValue::CharArray),
        prop::collection::vec(any::<String>(), 0..6).prop_map(TypedValue::StringArray),
    ]
}

/// Like [`typed_value_strategy`], but floats include NaN and infinities.
pub(crate) fn any_typed_value() -> impl Strategy<Value = TypedValue> {
    prop_oneof![
        4 => typed_value_strategy(),
        1 => any::<f32>().prop_map(TypedValue::Float),
        1 => any::<f64>().prop_map(TypedValue::Double),
        1 => prop::collection::vec(any::<f32>(), 0..4).prop_map(TypedValue::FloatArray),
        1 => prop::collection::vec(any::<f64>(), 0..4).prop_map(TypedValue::DoubleArray),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Canonical text restores the exact value for every tag
    #[test]
    fn text_round_trip(value in typed_value_strategy()) {
        let text = value.to_text();
        let parsed = TypedValue::parse_text(value.tag(), &text);
        prop_assert_eq!(parsed, Ok(value));
    }

    // Element texts restore arrays element-for-element
    #[test]
    fn text_array_round_trip(value in typed_value_strategy()) {
        let elements = value.to_text_array();
        let parsed = TypedValue::from_text_array(value.tag(), &elements);
        prop_assert_eq!(parsed, Ok(value));
    }

    // Assigning a value of a different tag always fails and never coerces
    #[test]
    fn set_rejects_other_tags(
        original in typed_value_strategy(),
        replacement in typed_value_strategy()
    ) {
        let mut slot = original.clone();
        let result = slot.set(replacement.clone());
        if original.tag() == replacement.tag() {
            prop_assert!(result.is_ok());
            prop_assert_eq!(slot, replacement);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(slot, original);
        }
    }

    // Integers outside the target width are rejected, never truncated
    #[test]
    fn byte_text_range_is_exact(n in any::<i64>()) {
        let parsed = TypedValue::parse_text(ValueTag::Byte, &n.to_string());
        if i8::try_from(n).is_ok() {
            prop_assert!(parsed.is_ok());
        } else {
            prop_assert!(parsed.is_err());
        }
    }
}
