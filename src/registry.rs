//! Format registry for format discovery and selection
//!
//! This module provides an explicit registry of available formats. A registry is a plain
//! value owned by whoever assembles a [`Transfer`](crate::Transfer); there is no global
//! table, so registration and lookup never race.

use crate::error::{FormatError, Result};
use crate::format::Format;
use std::collections::HashMap;

/// Registry of serialization formats
///
/// # Examples
///
/// ```ignore
/// let mut registry = FormatRegistry::with_defaults();
/// registry.register(MyFormat);
///
/// let format = registry.get("my-format")?;
/// let raw = format.decode(b"...")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        tracing::debug!("registering format '{}'", format.name());
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::UnknownFormat(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Find the format claiming a file extension (case-insensitive, without the dot)
    pub fn for_extension(&self, extension: &str) -> Option<&dyn Format> {
        let extension = extension.to_ascii_lowercase();
        let mut names = self.list_formats();
        // Sorted so that overlapping claims resolve the same way every time
        names.retain(|name| {
            self.formats[name]
                .file_extensions()
                .iter()
                .any(|ext| *ext == extension)
        });
        names.first().map(|name| self.formats[name].as_ref())
    }

    /// Create a registry with the built-in formats: json, yaml, toml and xml
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::JsonFormat);
        registry.register(crate::formats::YamlFormat);
        registry.register(crate::formats::TomlFormat);
        registry.register(crate::formats::XmlFormat::default());

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{RawValue, Value};

    // Test format
    struct TestFormat;
    impl Format for TestFormat {
        fn name(&self) -> &str {
            "test"
        }
        fn description(&self) -> &str {
            "Test format"
        }
        fn file_extensions(&self) -> &[&str] {
            &["tst"]
        }
        fn decode(&self, _input: &[u8]) -> Result<RawValue> {
            Ok(RawValue::String("test".to_string()))
        }
        fn encode(&self, _value: &Value) -> Result<Vec<u8>> {
            Ok(b"test output".to_vec())
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.formats.len(), 0);
    }

    #[test]
    fn test_registry_register() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        assert!(registry.has("test"));
        assert_eq!(registry.list_formats(), vec!["test"]);
    }

    #[test]
    fn test_registry_get() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let format = registry.get("test");
        assert!(format.is_ok());
        assert_eq!(format.unwrap().name(), "test");
    }

    #[test]
    fn test_registry_get_nonexistent() {
        let registry = FormatRegistry::new();
        match registry.get("nonexistent") {
            Err(FormatError::UnknownFormat(name)) => assert_eq!(name, "nonexistent"),
            _ => panic!("Expected UnknownFormat error"),
        }
    }

    #[test]
    fn test_registry_for_extension() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.for_extension("yml").unwrap().name(), "yaml");
        assert_eq!(registry.for_extension("JSON").unwrap().name(), "json");
        assert!(registry.for_extension("docx").is_none());
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(
            registry.list_formats(),
            vec!["json", "toml", "xml", "yaml"]
        );
    }

    #[test]
    fn test_registry_default_trait() {
        let registry = FormatRegistry::default();
        assert!(registry.has("json"));
        assert!(registry.has("xml"));
    }

    #[test]
    fn test_registry_replace_format() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);
        registry.register(TestFormat); // Replace

        assert_eq!(registry.list_formats().len(), 1);
    }
}
