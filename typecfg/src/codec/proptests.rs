//! Property-based round trips through every codec.

use proptest::prelude::*;

use super::Format;
use crate::configuration::Configuration;
use crate::error::Error;
use crate::options::{IoOptions, ReadPolicy};
use crate::property::PropertyDefinition;
use crate::value::proptests::any_typed_value;
use crate::value::TypedValue;

fn single(format: Format, value: TypedValue) -> Configuration {
    let mut builder = Configuration::builder();
    builder
        .name("app")
        .version("1.0")
        .filename(format!("app.{}", format.extension()));
    builder
        .put(PropertyDefinition::builder("key").value(value).build().unwrap())
        .unwrap();
    builder.build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        .. ProptestConfig::default()
    })]

    // Whatever a codec agrees to write, it reads back unchanged
    #[test]
    fn codec_round_trip(value in any_typed_value(), pretty in any::<bool>()) {
        let options = IoOptions::strict().with_pretty(pretty);
        for format in Format::ALL {
            let config = single(format, value.clone());
            let encoded = match format.encode(&config, &options) {
                Ok(encoded) => encoded,
                // JSON has no non-finite numbers, XML no control characters
                Err(Error::Encode { .. }) => continue,
                Err(other) => return Err(TestCaseError::fail(format!("{format}: {other}"))),
            };

            let loaded = format
                .decode(&config, &encoded, ReadPolicy::Strict)
                .map_err(|e| TestCaseError::fail(format!("{format}: {e}\n{encoded}")))?;
            let decoded = loaded.get("key");
            prop_assert!(decoded.is_some(), "{}: key missing", format);
            let decoded = decoded.unwrap();

            // canonical text compares NaN and signed zero exactly
            prop_assert_eq!(decoded.tag(), value.tag(), "{}", format);
            prop_assert_eq!(decoded.to_text(), value.to_text(), "{}\n{}", format, encoded);
        }
    }
}
