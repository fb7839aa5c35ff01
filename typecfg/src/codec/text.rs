//! Delimited text codec.
//!
//! Each property is one record terminated by `;`, optionally preceded by a
//! `#description#` line:
//!
//! ```text
//! #Interface language#
//! lang=EN;
//! ports=[8080,8081];
//! ```
//!
//! Backslash escapes `\\`, `\n`, `\r`, `\t`, `\b`, `\;`, `\=` and `\#`
//! keep the delimiters out of keys, values and descriptions. The format has
//! no header, so name and version are neither written nor checked.

use regex_lite::Regex;

use super::reconcile::reconcile;
use super::{Decoder, Encoder, Format, LoadedValues};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::{IoOptions, ReadPolicy};
use crate::value::TypedValue;

const RECORD: &str = r"(?s)^(?:#((?:[^#\\]|\\.)*)#)?\s*((?:[^=\\]|\\.)+)=((?:[^\\]|\\.)*)$";

/// Reads and writes delimited `key=value;` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Encoder for TextCodec {
    fn encode(&self, config: &Configuration, _options: &IoOptions) -> Result<String> {
        let mut out = String::new();
        for property in config.properties() {
            let key = property.key();
            if key.trim() != key {
                return Err(Error::Encode {
                    key: key.to_string(),
                    reason: "keys with surrounding whitespace cannot be read back".into(),
                });
            }
            if let Some(description) = property.description() {
                out.push('#');
                out.push_str(&escape(description));
                out.push_str("#\n");
            }
            out.push_str(&escape(key));
            out.push('=');
            out.push_str(&escape(&property.value().to_text()));
            out.push_str(";\n");
        }
        Ok(out)
    }
}

impl Decoder for TextCodec {
    fn decode(
        &self,
        config: &Configuration,
        input: &str,
        policy: ReadPolicy,
    ) -> Result<LoadedValues> {
        let pattern = Regex::new(RECORD).map_err(|e| Error::parse(Format::Text, e))?;

        let mut leaves = Vec::new();
        for record in split_records(input)? {
            let record = record.trim_start();
            let captures = pattern.captures(record).ok_or_else(|| {
                Error::parse(Format::Text, format!("malformed record '{record}'"))
            })?;
            let key = unescape(captures.get(2).map_or("", |m| m.as_str()))?;
            let value = unescape(captures.get(3).map_or("", |m| m.as_str()))?;
            leaves.push((key.trim().to_string(), value));
        }

        reconcile(config, leaves, policy, |property, text| {
            TypedValue::parse_text(property.tag(), text)
                .map_err(|e| e.into_malformed(property.key()))
        })
    }
}

/// Splits on unescaped `;`, rejecting trailing text with no terminator.
fn split_records(input: &str) -> Result<Vec<&str>> {
    let mut records = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ';' {
            records.push(&input[start..i]);
            start = i + 1;
        }
    }

    let rest = &input[start..];
    if !rest.trim().is_empty() {
        return Err(Error::parse(
            Format::Text,
            format!("record '{}' is missing its ';' terminator", rest.trim()),
        ));
    }
    Ok(records)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            ';' => out.push_str("\\;"),
            '=' => out.push_str("\\="),
            '#' => out.push_str("\\#"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some(';') => out.push(';'),
            Some('=') => out.push('='),
            Some('#') => out.push('#'),
            Some(other) => {
                return Err(Error::parse(
                    Format::Text,
                    format!("invalid escape sequence '\\{other}'"),
                ))
            }
            None => return Err(Error::parse(Format::Text, "dangling escape at end of record")),
        }
    }
    Ok(out)
}
