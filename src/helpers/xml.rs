//! XML utilities for the xlsx container.
//! Provides a reader wrapper with helper traits for attributes and text, and
//! a small writer used to emit package parts.

use crate::error::RustyTableError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for spreadsheet parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, `None` at end of input
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, RustyTableError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(RustyTableError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, RustyTableError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, RustyTableError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for XML nodes providing attribute access
pub(crate) trait XmlNodeHelper<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyTableError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyTableError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text content from BytesText event
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), RustyTableError>;

    /// Appends text content from BytesRef event (entities and character references)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyTableError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), RustyTableError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyTableError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

/// Streaming writer for one package part, buffered in memory.
pub(crate) struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Starts a standalone UTF-8 document.
    pub(crate) fn new() -> Result<XmlWriter, RustyTableError> {
        let mut writer = Writer::new(Vec::with_capacity(4096));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(XmlWriter { writer })
    }

    pub(crate) fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), RustyTableError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), RustyTableError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub(crate) fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), RustyTableError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// Writes escaped character data.
    ///
    /// Carriage returns go out as `&#13;`: readers normalize raw line endings.
    pub(crate) fn text(&mut self, value: &str) -> Result<(), RustyTableError> {
        for (index, segment) in value.split('\r').enumerate() {
            if index > 0 {
                self.writer.write_event(Event::GeneralRef(BytesRef::new("#13")))?;
            }
            if !segment.is_empty() {
                self.writer.write_event(Event::Text(BytesText::new(segment)))?;
            }
        }
        Ok(())
    }

    /// Writes `<name attributes>value</name>`.
    pub(crate) fn element(&mut self, name: &str, attributes: &[(&str, &str)], value: &str) -> Result<(), RustyTableError> {
        self.start(name, attributes)?;
        self.text(value)?;
        self.end(name)
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}
