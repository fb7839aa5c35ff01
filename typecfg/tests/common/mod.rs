//! Common test utilities for integration tests.
//!
//! Provides a schema covering every value type and helpers for placing
//! configurations in temporary directories.

use std::path::Path;
use std::sync::{Arc, Mutex};

use typecfg::{
    Configuration, ConfigurationBuilder, ConfigurationListener, Format, PropertyDefinition,
    TypedValue,
};

/// Builds a property with a value and nothing else.
#[allow(dead_code)]
pub fn prop(key: &str, value: impl Into<TypedValue>) -> PropertyDefinition {
    PropertyDefinition::builder(key)
        .value(value)
        .build()
        .unwrap()
}

/// One property per value type, with values chosen to survive every codec.
#[allow(dead_code)]
pub fn all_types() -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::builder("enabled")
            .value(true)
            .description("Master switch")
            .build()
            .unwrap(),
        prop("level", -7_i8),
        prop("retries", 1200_i16),
        prop("port", 8080_i32),
        prop("max_bytes", 9_007_199_254_740_993_i64),
        prop("ratio", 0.1_f32),
        prop("float_max", f32::MAX),
        prop("float_min", f32::MIN),
        prop("threshold", -2.5e-8_f64),
        prop("separator", ';'),
        PropertyDefinition::builder("greeting")
            .value("Hello, \"world\" <&> ; = # [x]\ttabbed")
            .description("Shown at startup; may contain # and =")
            .build()
            .unwrap(),
        prop("flags", vec![true, false, true]),
        prop("offsets", vec![-128_i8, 0, 127]),
        prop("ids", vec![i16::MIN, i16::MAX]),
        prop("ports", vec![80_i32, 443, 8443]),
        prop("stamps", vec![i64::MIN, 0, i64::MAX]),
        prop("weights", vec![1.5_f32, -0.25, 3.4e38, f32::MAX, f32::MIN_POSITIVE]),
        prop("bounds", vec![f64::MIN_POSITIVE, 1e300, -0.0]),
        prop("brackets", vec!['[', ',', '"', 'é']),
        prop("names", vec!["plain", "", "with, comma", "[bracketed]", "quote\"d", "back\\slash"]),
    ]
}

/// Starts a builder named `app` version `1.0` in `dir`.
#[allow(dead_code)]
pub fn builder_in(dir: &Path, format: Format) -> ConfigurationBuilder {
    let mut builder = Configuration::builder();
    builder
        .name("app")
        .version("1.0")
        .filename(format!("app.{}", format.extension()))
        .pathname(dir);
    builder
}

/// A configuration holding `properties`, stored in `dir` for `format`.
#[allow(dead_code)]
pub fn config_in(dir: &Path, format: Format, properties: Vec<PropertyDefinition>) -> Configuration {
    let mut builder = builder_in(dir, format);
    for property in properties {
        builder.put(property).unwrap();
    }
    builder.build().unwrap()
}

/// A listener that records every event as a line of text.
#[derive(Default)]
#[allow(dead_code)]
pub struct Recorder {
    events: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ConfigurationListener for Recorder {
    fn on_property_changed(&self, key: &str, value: &TypedValue) {
        self.push(format!("changed {key}={value}"));
    }

    fn on_loaded(&self, _path: &Path, format: Format) {
        self.push(format!("loaded {format}"));
    }

    fn on_saved(&self, _path: &Path, format: Format) {
        self.push(format!("saved {format}"));
    }

    fn on_deleted(&self, _path: &Path) {
        self.push("deleted".to_string());
    }
}
