//! Format implementations
//!
//! This module contains the built-in formats. JSON, YAML and TOML are thin bindings over
//! their serde crates; XML carries its own structural codec.

pub mod json;
pub mod toml;
pub mod xml;
pub mod yaml;

pub use self::json::JsonFormat;
pub use self::toml::TomlFormat;
pub use self::xml::XmlFormat;
pub use self::yaml::YamlFormat;
