#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # typecfg
//!
//! Typed configuration files with a declared schema.
//!
//! A [`Configuration`] is an ordered set of [`PropertyDefinition`]s, each
//! carrying a statically typed [`TypedValue`], an optional description, an
//! optional validator and an optional flag. The same schema can be written
//! to and read from JSON, XML, YAML, CSV and a delimited text format; on
//! read, the file is reconciled against the schema under a strict or
//! tolerant [`ReadPolicy`] and every value is decoded back to its declared
//! type.
//!
//! ## Core Types
//!
//! - [`TypedValue`] and [`ValueTag`]: the eighteen supported value types
//! - [`PropertyDefinition`] and [`PropertyBuilder`]: one schema entry
//! - [`Configuration`] and [`ConfigurationBuilder`]: the schema plus its file
//! - [`Format`]: codec selection and in-memory encode/decode
//! - [`io`]: file read, write and delete, sync and async
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use typecfg::{io, Configuration, Format, IoOptions, PropertyDefinition, TypedValue};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut builder = Configuration::builder();
//! builder
//!     .name("editor")
//!     .version("2.1")
//!     .filename("editor.xml")
//!     .pathname(dir.path());
//! builder
//!     .put(
//!         PropertyDefinition::builder("tab_width")
//!             .value(4_i8)
//!             .description("Spaces per tab")
//!             .validator(|v| v.as_byte().map(|w| w > 0).unwrap_or(false))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap()
//!     .put(
//!         PropertyDefinition::builder("recent")
//!             .value(Vec::<String>::new())
//!             .optional(true)
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//! let mut config = builder.build().unwrap();
//!
//! config.set_value("recent", vec!["a.rs", "b.rs"]).unwrap();
//! io::write(&config, Format::Xml, &IoOptions::default()).unwrap();
//!
//! config.set_value("tab_width", 8_i8).unwrap();
//! io::read(&mut config, Format::Xml, &IoOptions::strict()).unwrap();
//! assert_eq!(config.value("tab_width").unwrap(), &TypedValue::Byte(4));
//! ```

pub mod codec;
pub mod configuration;
pub mod error;
pub mod io;
pub mod listener;
pub mod logging;
pub mod options;
pub mod property;
pub mod value;

// Re-export key types at crate root for convenience
pub use codec::{Codec, Decoder, Encoder, Format, LoadedValues};
pub use configuration::{Configuration, ConfigurationBuilder, Snapshot};
pub use error::{Error, Result};
pub use io::{LoadedFile, PendingIo};
pub use listener::ConfigurationListener;
pub use logging::{init_logger, LogLevel, Logger};
pub use options::{IoOptions, ReadPolicy};
pub use property::{PropertyBuilder, PropertyDefinition, Validator};
pub use value::{ParseValueError, TypedValue, ValueTag};
