//! Format conversion through a single format-neutral value
//!
//!     This crate converts documents between JSON, YAML, TOML and XML. Every conversion runs
//!     the same three steps:
//!
//!     1. decode the input into a [`RawValue`] (the source format's keys, whatever their type)
//!     2. normalize it into a [`Value`] where every mapping is string-keyed
//!     3. encode the value with the target format
//!
//! Architecture
//!
//!     - Format trait: uniform decode/encode interface, optionally stream based
//!     - FormatRegistry: explicit, caller-owned table of formats keyed by name
//!     - Transfer: binds a source and target format and drives a conversion
//!
//!     JSON, YAML and TOML are thin bindings over their serde crates. XML needs real work: it
//!     has no list syntax, so the codec marks repeated elements with `type="array"` and
//!     rebuilds object/array shape from those markers and the element path on the way back.
//!     See [`formats::xml`].
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── value.rs                # Value, RawValue, Number
//!     ├── normalize.rs            # RawValue → Value key coercion
//!     ├── format.rs               # Format, Decoder, Encoder traits
//!     ├── registry.rs             # FormatRegistry
//!     ├── transfer.rs             # Transfer facade
//!     ├── formats
//!     │   ├── json / yaml / toml  # serde bindings
//!     │   └── xml
//!     │       ├── serializer.rs
//!     │       ├── parser.rs
//!     │       └── merge.rs
//!     └── lib.rs
//!
//! Lossy boundaries
//!
//!     Going through XML turns every scalar into a string and drops the document element's
//!     name. TOML cannot hold null. Round tripping is only exact between JSON and YAML.

pub mod error;
pub mod format;
pub mod formats;
pub mod normalize;
pub mod registry;
pub mod transfer;
pub mod value;

pub use error::{FormatError, Result};
pub use format::{Decoder, Encoder, FnFormat, Format};
pub use normalize::normalize;
pub use registry::FormatRegistry;
pub use transfer::Transfer;
pub use value::{Mapping, Number, RawValue, Value};

/// Names of the built-in formats.
pub const FORMAT_JSON: &str = "json";
pub const FORMAT_YAML: &str = "yaml";
pub const FORMAT_XML: &str = "xml";
pub const FORMAT_TOML: &str = "toml";
