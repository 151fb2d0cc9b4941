//! XML serialization
//!
//! Renders a string-keyed mapping as nested elements, one element per key, keys in sorted
//! order. Sequences become repeated sibling elements carrying `type="array"`.
//!
//! ## Example
//!
//! ```text
//! <xml>
//!     <name>demo</name>
//!     <tag type="array">a</tag>
//!     <tag type="array">b</tag>
//!     <owner>
//!         <id>7</id>
//!     </owner>
//! </xml>
//! ```
//!
//! Empty mappings produce no element at all, at any depth including the root, so an empty
//! document encodes to zero bytes. A sequence nested directly inside a sequence cannot be
//! expressed with a single marker attribute and is left out.

use super::{XmlMapping, ARRAY_MARKER, NAME};
use crate::error::{FormatError, Result};
use crate::value::{Mapping, Value};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Serializer that streams elements into a writer
pub(crate) struct XmlSerializer<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlSerializer<W> {
    /// `indent` spaces per nesting level; 0 writes everything on one line.
    pub(crate) fn new(inner: W, indent: usize) -> Self {
        let writer = if indent == 0 {
            Writer::new(inner)
        } else {
            Writer::new_with_indent(inner, b' ', indent)
        };
        Self { writer }
    }

    pub(crate) fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.writer.get_mut().flush()?;
        Ok(())
    }

    /// Write `document` wrapped in a `root_name` element.
    pub(crate) fn serialize_document(
        &mut self,
        root_name: &str,
        document: XmlMapping<'_>,
    ) -> Result<()> {
        self.serialize_mapping(root_name, document.mapping(), false)
    }

    fn serialize_mapping(&mut self, name: &str, map: &Mapping, marked: bool) -> Result<()> {
        if map.is_empty() {
            return Ok(());
        }
        self.start(name, marked)?;
        for (key, value) in map {
            self.serialize_entry(key, value)?;
        }
        self.end(name)
    }

    fn serialize_entry(&mut self, key: &str, value: &Value) -> Result<()> {
        match value {
            Value::Mapping(map) => self.serialize_mapping(key, map, false),
            Value::Sequence(items) => {
                for item in items {
                    match item {
                        Value::Mapping(map) => self.serialize_mapping(key, map, true)?,
                        Value::Sequence(_) => {
                            tracing::trace!("skipping nested sequence under <{key}>");
                        }
                        scalar => self.serialize_scalar(key, scalar, true)?,
                    }
                }
                Ok(())
            }
            scalar => self.serialize_scalar(key, scalar, false),
        }
    }

    fn serialize_scalar(&mut self, name: &str, value: &Value, marked: bool) -> Result<()> {
        let text = value.scalar_text().unwrap_or_default();
        self.start(name, marked)?;
        // Written even when empty so the closing tag stays on the same line
        self.event(Event::Text(BytesText::new(&text)))?;
        self.end(name)
    }

    fn start(&mut self, name: &str, marked: bool) -> Result<()> {
        if name.is_empty() {
            return Err(FormatError::codec(NAME, "start tag with no name"));
        }
        let mut start = BytesStart::new(name);
        if marked {
            start.push_attribute(ARRAY_MARKER);
        }
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| FormatError::codec(NAME, e))
    }
}

/// Serialize a document into a fresh buffer.
pub fn serialize_document(document: XmlMapping<'_>, root_name: &str, indent: usize) -> Result<Vec<u8>> {
    let mut serializer = XmlSerializer::new(Vec::new(), indent);
    serializer.serialize_document(root_name, document)?;
    Ok(serializer.into_inner())
}
