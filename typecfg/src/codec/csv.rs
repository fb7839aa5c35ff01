//! CSV codec.
//!
//! One header row, then one row per property:
//!
//! ```text
//! "CFG_NAME","CFG_VERSION","KEY","VALUE","DESCRIPTION"
//! "app","1.0","lang","EN","Interface language"
//! "app","1.0","ports","[8080,8081]",""
//! ```
//!
//! Every field is quoted (RFC 4180). `VALUE` holds the canonical text form,
//! so arrays are written as `[..]` lists.

use ::csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use super::reconcile::reconcile;
use super::{check_identity, require_identity, Decoder, Encoder, Format, LoadedValues};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::{IoOptions, ReadPolicy};
use crate::value::TypedValue;

/// Column names, in order.
pub const HEADER: [&str; 5] = ["CFG_NAME", "CFG_VERSION", "KEY", "VALUE", "DESCRIPTION"];

/// Reads and writes the CSV layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl Encoder for CsvCodec {
    fn encode(&self, config: &Configuration, _options: &IoOptions) -> Result<String> {
        let (name, version) = require_identity(config)?;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());

        writer.write_record(HEADER).map_err(|e| encode_error("", e))?;
        for property in config.properties() {
            let value = property.value().to_text();
            writer
                .write_record([
                    name,
                    version,
                    property.key(),
                    value.as_str(),
                    property.description().unwrap_or(""),
                ])
                .map_err(|e| encode_error(property.key(), e))?;
        }

        let bytes = writer.into_inner().map_err(|e| encode_error("", e))?;
        String::from_utf8(bytes).map_err(|e| encode_error("", e))
    }
}

impl Decoder for CsvCodec {
    fn decode(
        &self,
        config: &Configuration,
        input: &str,
        policy: ReadPolicy,
    ) -> Result<LoadedValues> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());

        let header = reader.headers().map_err(|e| Error::parse(Format::Csv, e))?;
        if !header.iter().eq(HEADER.iter().copied()) {
            return Err(Error::parse(
                Format::Csv,
                format!("expected header {}", HEADER.join(",")),
            ));
        }

        let mut leaves = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::parse(Format::Csv, e))?;
            check_identity(config, record.get(0), record.get(1))?;
            let key = record.get(2).unwrap_or_default().to_string();
            let value = record.get(3).unwrap_or_default().to_string();
            leaves.push((key, value));
        }

        reconcile(config, leaves, policy, |property, text| {
            TypedValue::parse_text(property.tag(), text)
                .map_err(|e| e.into_malformed(property.key()))
        })
    }
}

fn encode_error(key: &str, err: impl std::fmt::Display) -> Error {
    Error::Encode {
        key: key.to_string(),
        reason: format!("failed to write CSV: {err}"),
    }
}
