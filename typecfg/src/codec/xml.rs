//! XML codec.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <configuration name="app" version="1.0">
//!   <properties>
//!     <lang>
//!       <value>EN</value>
//!       <description>Interface language</description>
//!     </lang>
//!     <ports>
//!       <values>
//!         <value>8080</value>
//!         <value>8081</value>
//!       </values>
//!     </ports>
//!   </properties>
//! </configuration>
//! ```
//!
//! Each property is an element named after its key, so keys must be valid
//! XML names. Values are stored in canonical text form; whitespace inside
//! `<value>` is preserved and carriage returns are written as `&#13;`.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::reconcile::reconcile;
use super::{check_identity, require_identity, Decoder, Encoder, Format, LoadedValues};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::{IoOptions, ReadPolicy};
use crate::property::PropertyDefinition;
use crate::value::TypedValue;

const ROOT: &str = "configuration";
const PROPERTIES: &str = "properties";
const VALUE: &str = "value";
const VALUES: &str = "values";
const DESCRIPTION: &str = "description";

/// Reads and writes the XML layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl Encoder for XmlCodec {
    fn encode(&self, config: &Configuration, options: &IoOptions) -> Result<String> {
        let (name, version) = require_identity(config)?;
        check_text("", name)?;
        check_text("", version)?;

        let mut writer = if options.pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };

        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        emit(
            &mut writer,
            Event::Start(
                BytesStart::new(ROOT).with_attributes([("name", name), ("version", version)]),
            ),
        )?;
        emit(&mut writer, Event::Start(BytesStart::new(PROPERTIES)))?;
        for property in config.properties() {
            write_property(&mut writer, property)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new(PROPERTIES)))?;
        emit(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

        String::from_utf8(writer.into_inner()).map_err(encode_error)
    }
}

fn write_property(writer: &mut Writer<Vec<u8>>, property: &PropertyDefinition) -> Result<()> {
    let key = property.key();
    if !is_xml_name(key) {
        return Err(Error::Encode {
            key: key.to_string(),
            reason: "key is not a valid XML element name".into(),
        });
    }

    emit(writer, Event::Start(BytesStart::new(key)))?;
    let value = property.value();
    if value.tag().is_array() {
        let elements = value.to_text_array();
        if elements.is_empty() {
            emit(writer, Event::Empty(BytesStart::new(VALUES)))?;
        } else {
            emit(writer, Event::Start(BytesStart::new(VALUES)))?;
            for element in &elements {
                write_text_element(writer, key, VALUE, element)?;
            }
            emit(writer, Event::End(BytesEnd::new(VALUES)))?;
        }
    } else {
        write_text_element(writer, key, VALUE, &value.to_text())?;
    }
    if let Some(description) = property.description() {
        write_text_element(writer, key, DESCRIPTION, description)?;
    }
    emit(writer, Event::End(BytesEnd::new(key)))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    key: &str,
    name: &str,
    text: &str,
) -> Result<()> {
    check_text(key, text)?;
    let escaped = escape(text).replace('\r', "&#13;");
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::from_escaped(escaped)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(encode_error)
}

fn encode_error(err: impl std::fmt::Display) -> Error {
    Error::Encode {
        key: String::new(),
        reason: format!("failed to write XML: {err}"),
    }
}

/// Rejects characters XML 1.0 cannot carry at all.
fn check_text(key: &str, text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        None => Ok(()),
        Some(c) => Err(Error::Encode {
            key: key.to_string(),
            reason: format!("character U+{:04X} cannot be written to XML", u32::from(c)),
        }),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl Decoder for XmlCodec {
    fn decode(
        &self,
        config: &Configuration,
        input: &str,
        policy: ReadPolicy,
    ) -> Result<LoadedValues> {
        let root = parse_document(input)?;
        if root.name != ROOT {
            return Err(Error::parse(
                Format::Xml,
                format!("root element must be <{ROOT}>, found <{}>", root.name),
            ));
        }
        check_identity(config, root.attribute("name"), root.attribute("version"))?;

        let properties = root
            .children
            .into_iter()
            .find(|child| child.name == PROPERTIES)
            .ok_or_else(|| Error::parse(Format::Xml, format!("missing <{PROPERTIES}> element")))?;

        let leaves = properties
            .children
            .into_iter()
            .map(|element| (element.name.clone(), element))
            .collect();

        reconcile(config, leaves, policy, decode_leaf)
    }
}

fn decode_leaf(property: &PropertyDefinition, element: &Element) -> Result<TypedValue> {
    let key = property.key();
    let tag = property.tag();
    let malformed = |reason: String| Error::MalformedProperty {
        key: key.to_string(),
        expected: tag,
        value: String::new(),
        reason,
    };
    let single = |name: &str| match element.children_named(name).as_slice() {
        [] => Err(malformed(format!("missing <{name}> element"))),
        [only] => Ok(*only),
        _ => Err(malformed(format!("several <{name}> elements"))),
    };

    let parsed = if tag.is_array() {
        let values = single(VALUES)?;
        if let Some(stray) = values.children.iter().find(|c| c.name != VALUE) {
            return Err(malformed(format!(
                "unexpected <{}> element in <{VALUES}>",
                stray.name
            )));
        }
        let texts: Vec<&str> = values.children.iter().map(|c| c.text.as_str()).collect();
        TypedValue::from_text_array(tag, &texts)
    } else {
        TypedValue::parse_text(tag, &single(VALUE)?.text)
    };
    parsed.map_err(|e| e.into_malformed(key))
}

/// A parsed element with its concatenated character data.
#[derive(Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| Error::parse(Format::Xml, e))?;
            let key = utf8(attribute.key.as_ref())?.to_string();
            let value = attribute
                .unescape_value()
                .map_err(|e| Error::parse(Format::Xml, e))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn children_named(&self, name: &str) -> Vec<&Element> {
        self.children.iter().filter(|c| c.name == name).collect()
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::parse(Format::Xml, e))
}

fn parse_document(input: &str) -> Result<Element> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    loop {
        match reader.read_event().map_err(|e| Error::parse(Format::Xml, e))? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::parse(Format::Xml, "unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| Error::parse(Format::Xml, e))?;
                append_text(&mut stack, text)?;
            }
            Event::CData(data) => {
                let text = utf8(&data)?.to_string();
                append_text(&mut stack, Cow::Owned(text))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::parse(
            Format::Xml,
            format!("unclosed element <{}>", open.name),
        ));
    }
    root.ok_or_else(|| Error::parse(Format::Xml, "document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(Error::parse(Format::Xml, "document has several root elements"))
    } else {
        *root = Some(element);
        Ok(())
    }
}

fn append_text(stack: &mut [Element], text: Cow<'_, str>) -> Result<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(&text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::parse(Format::Xml, "text outside the root element")),
    }
}
