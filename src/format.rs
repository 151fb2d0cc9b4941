//! Format trait definition
//!
//! This module defines the Format trait that every codec implements. A format turns bytes
//! into a [`RawValue`] and a normalized [`Value`] back into bytes. Formats that can work
//! directly on streams also hand out a [`Decoder`] / [`Encoder`] bound to a reader / writer.

use crate::error::{FormatError, Result};
use crate::value::{RawValue, Value};
use std::io::{BufRead, Write};

/// Decoder bound to an input stream.
pub trait Decoder {
    /// Decode one document from the underlying reader.
    fn decode(&mut self) -> Result<RawValue>;
}

/// Encoder bound to an output stream.
pub trait Encoder {
    /// Encode one document into the underlying writer.
    fn encode(&mut self, value: &Value) -> Result<()>;
}

/// Trait for serialization formats
///
/// Implementors provide bidirectional conversion between bytes and the value model.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn decode(&self, input: &[u8]) -> Result<RawValue> {
///         todo!()
///     }
///
///     fn encode(&self, value: &Value) -> Result<Vec<u8>> {
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "json", "yaml")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions claimed by this format, without the dot
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Decode a complete document
    fn decode(&self, input: &[u8]) -> Result<RawValue>;

    /// Encode a normalized value
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Whether [`Format::decoder`] and [`Format::encoder`] are available
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Build a decoder reading from `reader`
    ///
    /// Default implementation returns NotSupported error.
    fn decoder<'r>(&self, _reader: Box<dyn BufRead + 'r>) -> Result<Box<dyn Decoder + 'r>> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support stream decoding",
            self.name()
        )))
    }

    /// Build an encoder writing to `writer`
    ///
    /// Default implementation returns NotSupported error.
    fn encoder<'w>(&self, _writer: Box<dyn Write + 'w>) -> Result<Box<dyn Encoder + 'w>> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support stream encoding",
            self.name()
        )))
    }
}

pub type DecodeFn = fn(&[u8]) -> Result<RawValue>;
pub type EncodeFn = fn(&Value) -> Result<Vec<u8>>;

/// Format assembled from a plain decode / encode function pair.
///
/// ```ignore
/// registry.register(FnFormat::new("json5", decode_json5, encode_json5));
/// ```
pub struct FnFormat {
    name: String,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl FnFormat {
    pub fn new(name: impl Into<String>, decode: DecodeFn, encode: EncodeFn) -> Self {
        Self {
            name: name.into(),
            decode,
            encode,
        }
    }
}

impl Format for FnFormat {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, input: &[u8]) -> Result<RawValue> {
        (self.decode)(input)
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        (self.encode)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_lines(input: &[u8]) -> Result<RawValue> {
        let text = std::str::from_utf8(input).map_err(|e| FormatError::codec("lines", e))?;
        Ok(RawValue::Sequence(
            text.lines().map(|l| RawValue::String(l.to_string())).collect(),
        ))
    }

    fn encode_lines(value: &Value) -> Result<Vec<u8>> {
        let items = value
            .as_sequence()
            .ok_or_else(|| FormatError::codec("lines", "expected a sequence"))?;
        let lines: Vec<String> = items.iter().filter_map(Value::scalar_text).collect();
        Ok(lines.join("\n").into_bytes())
    }

    #[test]
    fn test_fn_format_delegates() {
        let format = FnFormat::new("lines", decode_lines, encode_lines);
        assert_eq!(format.name(), "lines");
        assert!(!format.supports_streaming());

        let raw = format.decode(b"a\nb").unwrap();
        assert_eq!(
            raw,
            RawValue::Sequence(vec![
                RawValue::String("a".into()),
                RawValue::String("b".into())
            ])
        );

        let out = format
            .encode(&Value::Sequence(vec![Value::from("x"), Value::from(1)]))
            .unwrap();
        assert_eq!(out, b"x\n1");
    }

    #[test]
    fn test_streaming_defaults_to_not_supported() {
        let format = FnFormat::new("lines", decode_lines, encode_lines);
        let reader: Box<dyn BufRead> = Box::new(&b""[..]);
        assert!(matches!(
            format.decoder(reader),
            Err(FormatError::NotSupported(_))
        ));
        let writer: Box<dyn Write> = Box::new(Vec::new());
        assert!(matches!(
            format.encoder(writer),
            Err(FormatError::NotSupported(_))
        ));
    }
}
