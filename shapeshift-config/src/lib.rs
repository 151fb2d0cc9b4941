//! Shared configuration loader for shapeshift.
//!
//! `defaults/shapeshift.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ShapeshiftConfig`].

use config::builder::DefaultState;
pub use config::ConfigError;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use shapeshift::formats::XmlFormat;
use shapeshift::FormatRegistry;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/shapeshift.default.toml");

/// Top-level configuration consumed by shapeshift applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeshiftConfig {
    pub convert: ConvertConfig,
    pub xml: XmlConfig,
}

/// Fallback formats for conversions.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub from: String,
    pub to: String,
}

/// XML encoder knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct XmlConfig {
    pub root_name: String,
    pub indent: usize,
}

impl XmlConfig {
    pub fn format(&self) -> XmlFormat {
        XmlFormat::new(self.root_name.clone(), self.indent)
    }
}

impl ShapeshiftConfig {
    /// Default registry with the XML format replaced by the configured one.
    pub fn registry(&self) -> FormatRegistry {
        let mut registry = FormatRegistry::with_defaults();
        registry.register(self.xml.format());
        registry
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `xml.indent` from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ShapeshiftConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ShapeshiftConfig, ConfigError> {
    Loader::new().build()
}
