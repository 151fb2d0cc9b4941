//! YAML format
//!
//! Binding over serde_yaml. YAML is where non-string mapping keys come from in practice
//! (`1: one`, `true: yes`, `~: nothing`); they reach the normalizer untouched.
//! Tagged values and multi-document streams are rejected by the codec.

use crate::error::{FormatError, Result};
use crate::format::{Decoder, Encoder, Format};
use crate::value::{RawValue, Value};
use std::io::{BufRead, Write};

const NAME: &str = crate::FORMAT_YAML;

/// Format implementation for YAML
pub struct YamlFormat;

impl Format for YamlFormat {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "YAML Ain't Markup Language"
    }

    fn file_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn decode(&self, input: &[u8]) -> Result<RawValue> {
        serde_yaml::from_slice(input).map_err(|e| FormatError::codec(NAME, e))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| FormatError::codec(NAME, e))
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn decoder<'r>(&self, reader: Box<dyn BufRead + 'r>) -> Result<Box<dyn Decoder + 'r>> {
        Ok(Box::new(YamlDecoder { reader }))
    }

    fn encoder<'w>(&self, writer: Box<dyn Write + 'w>) -> Result<Box<dyn Encoder + 'w>> {
        Ok(Box::new(YamlEncoder { writer }))
    }
}

struct YamlDecoder<'r> {
    reader: Box<dyn BufRead + 'r>,
}

impl Decoder for YamlDecoder<'_> {
    fn decode(&mut self) -> Result<RawValue> {
        serde_yaml::from_reader(&mut self.reader).map_err(|e| FormatError::codec(NAME, e))
    }
}

struct YamlEncoder<'w> {
    writer: Box<dyn Write + 'w>,
}

impl Encoder for YamlEncoder<'_> {
    fn encode(&mut self, value: &Value) -> Result<()> {
        serde_yaml::to_writer(&mut self.writer, value).map_err(|e| FormatError::codec(NAME, e))?;
        self.writer.flush()?;
        Ok(())
    }
}
