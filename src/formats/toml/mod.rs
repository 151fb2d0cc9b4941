//! TOML format
//!
//! Binding over the toml crate. Decoding goes through `toml::Value` so datetimes turn into
//! strings instead of leaking the crate's private datetime wrapper. TOML has no null and its
//! root must be a table; values that violate either rule fail to encode.
//!
//! The toml crate has no incremental reader, so the stream codecs buffer the whole document.

use crate::error::{FormatError, Result};
use crate::format::{Decoder, Encoder, Format};
use crate::value::{RawValue, Value};
use std::io::{BufRead, Read, Write};

const NAME: &str = crate::FORMAT_TOML;

/// Format implementation for TOML
pub struct TomlFormat;

impl Format for TomlFormat {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Tom's Obvious Minimal Language"
    }

    fn file_extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn decode(&self, input: &[u8]) -> Result<RawValue> {
        let text = std::str::from_utf8(input).map_err(|e| FormatError::codec(NAME, e))?;
        let table: ::toml::Table =
            ::toml::from_str(text).map_err(|e| FormatError::codec(NAME, e))?;
        Ok(RawValue::from(::toml::Value::Table(table)))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        if !matches!(value, Value::Mapping(_)) {
            return Err(FormatError::codec(
                NAME,
                format!("document root must be a table, got {}", value.kind()),
            ));
        }
        ::toml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| FormatError::codec(NAME, e))
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn decoder<'r>(&self, reader: Box<dyn BufRead + 'r>) -> Result<Box<dyn Decoder + 'r>> {
        Ok(Box::new(TomlDecoder { reader }))
    }

    fn encoder<'w>(&self, writer: Box<dyn Write + 'w>) -> Result<Box<dyn Encoder + 'w>> {
        Ok(Box::new(TomlEncoder { writer }))
    }
}

struct TomlDecoder<'r> {
    reader: Box<dyn BufRead + 'r>,
}

impl Decoder for TomlDecoder<'_> {
    fn decode(&mut self) -> Result<RawValue> {
        let mut input = Vec::new();
        self.reader.read_to_end(&mut input)?;
        TomlFormat.decode(&input)
    }
}

struct TomlEncoder<'w> {
    writer: Box<dyn Write + 'w>,
}

impl Encoder for TomlEncoder<'_> {
    fn encode(&mut self, value: &Value) -> Result<()> {
        let output = TomlFormat.encode(value)?;
        self.writer.write_all(&output)?;
        self.writer.flush()?;
        Ok(())
    }
}
