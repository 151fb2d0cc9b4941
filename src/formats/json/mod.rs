//! JSON format
//!
//! Thin binding over serde_json. Encoding is compact and, since mappings iterate sorted,
//! keys always come out in lexicographic order. The stream encoder terminates the document
//! with a newline; the stream decoder reads exactly one document.
//!
//! [`check`] is a standalone syntax validator reporting where a payload stops being JSON.
//! It is not part of the conversion path.

use crate::error::{FormatError, Result};
use crate::format::{Decoder, Encoder, Format};
use crate::value::{RawValue, Value};
use serde::de::{Deserialize, IgnoredAny};
use std::io::{BufRead, Write};
use thiserror::Error;

const NAME: &str = crate::FORMAT_JSON;

/// Format implementation for JSON
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "JavaScript Object Notation"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn decode(&self, input: &[u8]) -> Result<RawValue> {
        serde_json::from_slice(input).map_err(|e| FormatError::codec(NAME, e))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| FormatError::codec(NAME, e))
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn decoder<'r>(&self, reader: Box<dyn BufRead + 'r>) -> Result<Box<dyn Decoder + 'r>> {
        Ok(Box::new(JsonDecoder { reader }))
    }

    fn encoder<'w>(&self, writer: Box<dyn Write + 'w>) -> Result<Box<dyn Encoder + 'w>> {
        Ok(Box::new(JsonEncoder { writer }))
    }
}

struct JsonDecoder<'r> {
    reader: Box<dyn BufRead + 'r>,
}

impl Decoder for JsonDecoder<'_> {
    fn decode(&mut self) -> Result<RawValue> {
        let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
        RawValue::deserialize(&mut de).map_err(|e| FormatError::codec(NAME, e))
    }
}

struct JsonEncoder<'w> {
    writer: Box<dyn Write + 'w>,
}

impl Encoder for JsonEncoder<'_> {
    fn encode(&mut self, value: &Value) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value).map_err(|e| FormatError::codec(NAME, e))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Position of the first syntax error in a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column within the line.
    pub column: usize,
    pub message: String,
}

/// Check that `payload` is one well-formed JSON document.
pub fn check(payload: &[u8]) -> std::result::Result<(), SyntaxError> {
    match serde_json::from_slice::<IgnoredAny>(payload) {
        Ok(_) => Ok(()),
        Err(err) => {
            let full = err.to_string();
            let position = format!(" at line {} column {}", err.line(), err.column());
            let message = full.strip_suffix(&position).unwrap_or(&full).to_string();
            Err(SyntaxError {
                line: err.line(),
                column: err.column(),
                message,
            })
        }
    }
}
