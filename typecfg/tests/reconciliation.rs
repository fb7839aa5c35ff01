//! Reading files that disagree with the schema.

mod common;

use std::fs;

use common::{config_in, prop};
use tempfile::TempDir;
use typecfg::{
    io, Configuration, Error, Format, IoOptions, PropertyDefinition, TypedValue, ValueTag,
};

fn json_config(dir: &TempDir, properties: Vec<PropertyDefinition>) -> Configuration {
    config_in(dir.path(), Format::Json, properties)
}

fn write_json(config: &Configuration, properties: &str) {
    let body = format!(r#"{{"name":"app","version":"1.0","properties":[{properties}]}}"#);
    fs::write(config.path(), body).unwrap();
}

#[test]
fn test_strict_read_reports_deleted_entry() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("lang", "EN"), prop("theme", "dark")]);
    io::write(&config, Format::Json, &IoOptions::default()).unwrap();

    // drop the lang entry from the file
    let mut document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.path()).unwrap()).unwrap();
    document["properties"]
        .as_array_mut()
        .unwrap()
        .retain(|entry| entry.get("lang").is_none());
    fs::write(config.path(), document.to_string()).unwrap();

    let err = io::read(&mut config, Format::Json, &IoOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::MissingProperty { ref key } if key == "lang"));

    // tolerant keeps the in-memory value
    config.set_value("lang", "FR").unwrap();
    io::read(&mut config, Format::Json, &IoOptions::default()).unwrap();
    assert_eq!(config.value("lang").unwrap(), &TypedValue::from("FR"));
}

#[test]
fn test_byte_out_of_range_leaves_value_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("level", 5_i8)]);
    write_json(&config, r#"{"level":200}"#);

    let err = io::read(&mut config, Format::Json, &IoOptions::default()).unwrap_err();
    match err {
        Error::MalformedProperty {
            key,
            expected,
            reason,
            ..
        } => {
            assert_eq!(key, "level");
            assert_eq!(expected, ValueTag::Byte);
            assert!(reason.contains("out of byte range"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(config.value("level").unwrap(), &TypedValue::Byte(5));
}

#[test]
fn test_char_decoding() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("initial", 'z')]);

    write_json(&config, r#"{"initial":"ab"}"#);
    let err = io::read(&mut config, Format::Json, &IoOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedProperty { ref key, .. } if key == "initial"));
    assert_eq!(config.value("initial").unwrap(), &TypedValue::Char('z'));

    write_json(&config, r#"{"initial":"a"}"#);
    io::read(&mut config, Format::Json, &IoOptions::default()).unwrap();
    assert_eq!(config.value("initial").unwrap(), &TypedValue::Char('a'));
}

#[test]
fn test_validator_gate_keeps_old_value() {
    let dir = TempDir::new().unwrap();
    let nickname = PropertyDefinition::builder("nickname")
        .value("anon")
        .validator(|v| v.as_str().map(|s| s.chars().count() >= 3).unwrap_or(false))
        .build()
        .unwrap();
    let mut config = json_config(&dir, vec![nickname]);

    write_json(&config, r#"{"nickname":"ok"}"#);
    let err = io::read(&mut config, Format::Json, &IoOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidProperty { ref key, ref value } if key == "nickname" && value == "ok"
    ));
    assert_eq!(config.value("nickname").unwrap(), &TypedValue::from("anon"));
}

#[test]
fn test_failed_read_applies_nothing() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("a", 1), prop("b", 2), prop("c", 3)]);
    write_json(&config, r#"{"a":10},{"b":20},{"c":"thirty"}"#);

    assert!(io::read(&mut config, Format::Json, &IoOptions::default()).is_err());
    assert_eq!(config.value("a").unwrap(), &TypedValue::Int(1));
    assert_eq!(config.value("b").unwrap(), &TypedValue::Int(2));
}

#[test]
fn test_identity_mismatch_is_fatal_under_any_policy() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("a", 1)]);
    fs::write(
        config.path(),
        r#"{"name":"other-app","version":"1.0","properties":[{"a":2}]}"#,
    )
    .unwrap();

    for options in [IoOptions::strict(), IoOptions::default()] {
        let err = io::read(&mut config, Format::Json, &options).unwrap_err();
        assert!(matches!(
            err,
            Error::IdentityMismatch { field: "name", ref found, .. } if found == "other-app"
        ));
    }
}

#[test]
fn test_duplicate_entries_are_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("a", 1)]);
    write_json(&config, r#"{"a":2},{"a":3}"#);
    let err = io::read(&mut config, Format::Json, &IoOptions::default()).unwrap_err();
    assert!(matches!(err, Error::DuplicateProperty { ref key } if key == "a"));
}

#[test]
fn test_strict_rejects_and_tolerant_skips_unknown() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("a", 1)]);
    write_json(&config, r#"{"a":2},{"legacy":true}"#);

    let err = io::read(&mut config, Format::Json, &IoOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::UnknownProperty { ref key } if key == "legacy"));
    assert_eq!(config.value("a").unwrap(), &TypedValue::Int(1));

    io::read(&mut config, Format::Json, &IoOptions::default()).unwrap();
    assert_eq!(config.value("a").unwrap(), &TypedValue::Int(2));
    assert!(!config.contains("legacy"));
}

#[test]
fn test_optional_property_may_be_absent_under_strict() {
    let dir = TempDir::new().unwrap();
    let proxy = PropertyDefinition::builder("proxy")
        .value("")
        .optional(true)
        .build()
        .unwrap();
    let mut config = json_config(&dir, vec![prop("a", 1), proxy]);
    write_json(&config, r#"{"a":4}"#);

    io::read(&mut config, Format::Json, &IoOptions::strict()).unwrap();
    assert_eq!(config.value("a").unwrap(), &TypedValue::Int(4));
    assert_eq!(config.value("proxy").unwrap(), &TypedValue::from(""));
}

#[test]
fn test_fail_fast_reports_first_fault_in_schema_order() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("first", 1), prop("second", 1)]);
    write_json(&config, r#"{"second":"bad"},{"first":"also bad"}"#);
    let err = io::read(&mut config, Format::Json, &IoOptions::default()).unwrap_err();
    assert_eq!(err.key(), Some("first"));
}

#[test]
fn test_text_format_reconciles_without_header() {
    let dir = TempDir::new().unwrap();
    let mut builder = Configuration::builder();
    builder.filename("plain.cfg").pathname(dir.path());
    builder.put(prop("retries", 3_i16)).unwrap();
    let mut config = builder.build().unwrap();

    fs::write(config.path(), "#Retry count#\nretries = 9;\nextra=1;\n").unwrap();
    let err = io::read(&mut config, Format::Text, &IoOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::UnknownProperty { .. }));

    io::read(&mut config, Format::Text, &IoOptions::default()).unwrap();
    assert_eq!(config.value("retries").unwrap(), &TypedValue::Short(9));
}

#[test]
fn test_type_mismatch_on_set() {
    let dir = TempDir::new().unwrap();
    let mut config = json_config(&dir, vec![prop("port", 8080)]);
    let err = config.set_value("port", "8080").unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch {
            expected: ValueTag::Int,
            found: ValueTag::String
        }
    ));
    assert!(matches!(
        config.set_value("port", 8080_i64).unwrap_err(),
        Error::TypeMismatch { .. }
    ));
}

#[test]
fn test_duplicate_key_build() {
    let mut builder = Configuration::builder();
    builder.filename("app.json");
    builder.put(prop("x", 1)).unwrap();
    let err = builder.put(prop("x", 2)).unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { ref key } if key == "x"));

    let config = builder.build().unwrap();
    assert_eq!(config.len(), 1);
    assert_eq!(config.value("x").unwrap(), &TypedValue::Int(1));
}
