//! XML format
//!
//!     XML has elements and text but no notion of a list, so this codec adds a side-channel
//!     convention on top of plain XML: every element that belongs to a repeated group carries
//!     `type="array"`, on every occurrence including the first. Readers unaware of the
//!     convention just see an ordinary attribute.
//!
//!     - serializer.rs: mapping → elements, sorted keys, marker on sequence items
//!     - parser.rs: token stream → element path bookkeeping
//!     - merge.rs: path + array occurrence counts → rebuilt tree
//!
//!     Lossy boundaries: every scalar decodes as a string, the document element's name is
//!     not kept, sequences of sequences are not representable, and namespaces are ignored
//!     (elements are matched on their local name).

mod merge;
mod parser;
mod serializer;

pub use merge::{merge, ArrayOccurrences, ElementPath};
pub use parser::{parse_document, MAX_DEPTH};
pub use serializer::serialize_document;

use crate::error::{FormatError, Result};
use crate::format::{Decoder, Encoder, Format};
use crate::value::{Mapping, RawValue, Value};
use serializer::XmlSerializer;
use std::io::{BufRead, Write};

pub(crate) const NAME: &str = crate::FORMAT_XML;

/// Attribute marking an element as one item of a list.
pub const ARRAY_MARKER: (&str, &str) = ("type", "array");

/// Element name wrapping encoded documents unless configured otherwise.
pub const DEFAULT_ROOT_NAME: &str = "xml";

/// Spaces per nesting level unless configured otherwise.
pub const DEFAULT_INDENT: usize = 4;

/// A value accepted as an XML document: its root must be a mapping.
#[derive(Debug, Clone, Copy)]
pub struct XmlMapping<'a>(&'a Mapping);

impl<'a> XmlMapping<'a> {
    pub fn new(mapping: &'a Mapping) -> Self {
        XmlMapping(mapping)
    }

    pub fn mapping(&self) -> &'a Mapping {
        self.0
    }
}

impl<'a> TryFrom<&'a Value> for XmlMapping<'a> {
    type Error = FormatError;

    fn try_from(value: &'a Value) -> Result<Self> {
        match value {
            Value::Mapping(map) => Ok(XmlMapping(map)),
            other => Err(FormatError::codec(
                NAME,
                format!("document root must be a mapping, got {}", other.kind()),
            )),
        }
    }
}

/// Format implementation for XML
#[derive(Debug, Clone)]
pub struct XmlFormat {
    root_name: String,
    indent: usize,
}

impl XmlFormat {
    pub fn new(root_name: impl Into<String>, indent: usize) -> Self {
        Self {
            root_name: root_name.into(),
            indent,
        }
    }
}

impl Default for XmlFormat {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME, DEFAULT_INDENT)
    }
}

impl Format for XmlFormat {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "XML with type=\"array\" markers for repeated elements"
    }

    fn file_extensions(&self) -> &[&str] {
        &["xml"]
    }

    fn decode(&self, input: &[u8]) -> Result<RawValue> {
        let document = parse_document(input)?;
        Ok(RawValue::from(Value::Mapping(document)))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        serialize_document(XmlMapping::try_from(value)?, &self.root_name, self.indent)
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn decoder<'r>(&self, reader: Box<dyn BufRead + 'r>) -> Result<Box<dyn Decoder + 'r>> {
        Ok(Box::new(XmlDecoder { reader }))
    }

    fn encoder<'w>(&self, writer: Box<dyn Write + 'w>) -> Result<Box<dyn Encoder + 'w>> {
        Ok(Box::new(XmlEncoder {
            serializer: XmlSerializer::new(writer, self.indent),
            root_name: self.root_name.clone(),
        }))
    }
}

struct XmlDecoder<'r> {
    reader: Box<dyn BufRead + 'r>,
}

impl Decoder for XmlDecoder<'_> {
    fn decode(&mut self) -> Result<RawValue> {
        let document = parse_document(&mut self.reader)?;
        Ok(RawValue::from(Value::Mapping(document)))
    }
}

struct XmlEncoder<'w> {
    serializer: XmlSerializer<Box<dyn Write + 'w>>,
    root_name: String,
}

impl Encoder for XmlEncoder<'_> {
    fn encode(&mut self, value: &Value) -> Result<()> {
        self.serializer
            .serialize_document(&self.root_name, XmlMapping::try_from(value)?)?;
        self.serializer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = XmlFormat::default()
            .encode(&Value::Sequence(vec![Value::from(1)]))
            .unwrap_err();
        assert!(matches!(err, FormatError::CodecFailure { .. }));
        assert!(err.to_string().contains("root must be a mapping"));
    }

    #[test]
    fn test_custom_root_name() {
        let mut map = Mapping::new();
        map.insert("a".into(), Value::from("1"));
        let out = XmlFormat::new("doc", 0)
            .encode(&Value::Mapping(map))
            .unwrap();
        assert_eq!(out, b"<doc><a>1</a></doc>");
    }

    #[test]
    fn test_decode_yields_string_keyed_mapping() {
        let raw = XmlFormat::default().decode(b"<x><k>v</k></x>").unwrap();
        assert_eq!(
            raw,
            RawValue::Mapping(vec![(
                RawValue::String("k".into()),
                RawValue::String("v".into())
            )])
        );
    }

    #[test]
    fn test_stream_codecs() {
        let format = XmlFormat::default();
        let mut decoder = format
            .decoder(Box::new(&br#"<x><n type="array">1</n><n type="array">2</n></x>"#[..]))
            .unwrap();
        let value = crate::normalize(decoder.decode().unwrap()).unwrap();

        let mut out = Vec::new();
        format
            .encoder(Box::new(&mut out))
            .unwrap()
            .encode(&value)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<xml>\n    <n type=\"array\">1</n>\n    <n type=\"array\">2</n>\n</xml>"
        );
    }
}
