//! Transfer facade
//!
//! A [`Transfer`] binds a source and a target format from a [`FormatRegistry`] and drives
//! one conversion per call: decode → normalize → encode. Both formats are resolved before
//! any input is touched, so an unknown name fails without reading anything.
//!
//! ```ignore
//! let registry = FormatRegistry::with_defaults();
//! let yaml = Transfer::new(&registry, "json", "yaml").exchange(br#"{"a":1}"#)?;
//! ```

use crate::error::Result;
use crate::format::Format;
use crate::normalize::normalize;
use crate::registry::FormatRegistry;
use std::io::{BufRead, Write};

/// Conversion between two registered formats.
pub struct Transfer<'a> {
    registry: &'a FormatRegistry,
    source: String,
    target: String,
}

impl<'a> Transfer<'a> {
    pub fn new(
        registry: &'a FormatRegistry,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn source_format(&self) -> &str {
        &self.source
    }

    pub fn target_format(&self) -> &str {
        &self.target
    }

    fn resolve(&self) -> Result<(&'a dyn Format, &'a dyn Format)> {
        let source = self.registry.get(&self.source)?;
        let target = self.registry.get(&self.target)?;
        Ok((source, target))
    }

    /// Convert a complete document held in memory.
    pub fn exchange(&self, input: &[u8]) -> Result<Vec<u8>> {
        let (source, target) = self.resolve()?;
        tracing::debug!(
            "exchange {} -> {} ({} bytes)",
            self.source,
            self.target,
            input.len()
        );

        let raw = source.decode(input)?;
        let value = normalize(raw)?;
        target.encode(&value)
    }

    /// Convert one document read from `reader`, writing the result to `writer`.
    ///
    /// Formats without stream codecs fall back to their buffer codec.
    pub fn exchange_stream<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        let (source, target) = self.resolve()?;
        tracing::debug!("stream exchange {} -> {}", self.source, self.target);

        let raw = if source.supports_streaming() {
            source.decoder(Box::new(reader))?.decode()?
        } else {
            tracing::debug!("'{}' has no stream decoder, buffering input", self.source);
            let mut input = Vec::new();
            reader.read_to_end(&mut input)?;
            source.decode(&input)?
        };
        let value = normalize(raw)?;

        if target.supports_streaming() {
            target.encoder(Box::new(writer))?.encode(&value)
        } else {
            tracing::debug!("'{}' has no stream encoder, buffering output", self.target);
            let output = target.encode(&value)?;
            writer.write_all(&output)?;
            writer.flush()?;
            Ok(())
        }
    }
}
