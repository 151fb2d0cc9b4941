//! Key normalization
//!
//! Decoders disagree on what a mapping key may be. YAML allows integers, booleans, null and
//! even whole collections as keys, while every encoder downstream wants strings. This pass
//! turns a [`RawValue`] into a [`Value`] whose mappings are string-keyed at every depth,
//! without touching sequence order or scalar values.
//!
//! Key coercion:
//!
//! - string: unchanged
//! - integer: base-10 text
//! - float: shortest text that round-trips
//! - bool: `true` / `false`
//! - null: `null`
//! - sequence or mapping: [`FormatError::KeyTypeMismatch`], which aborts the conversion

use crate::error::{FormatError, Result};
use crate::value::{Mapping, RawValue, Value};

/// Normalize a freshly decoded value.
///
/// When two keys coerce to the same string (`1` and `"1"`), the later one in source order wins.
pub fn normalize(raw: RawValue) -> Result<Value> {
    match raw {
        RawValue::Null => Ok(Value::Null),
        RawValue::Bool(b) => Ok(Value::Bool(b)),
        RawValue::Number(n) => Ok(Value::Number(n)),
        RawValue::String(s) => Ok(Value::String(s)),
        RawValue::Sequence(items) => items
            .into_iter()
            .map(normalize)
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        RawValue::Mapping(pairs) => {
            let mut map = Mapping::new();
            for (key, value) in pairs {
                let value = normalize(value)?;
                map.insert(coerce_key(key)?, value);
            }
            Ok(Value::Mapping(map))
        }
    }
}

/// Render a mapping key as a string.
pub fn coerce_key(key: RawValue) -> Result<String> {
    match key {
        RawValue::String(s) => Ok(s),
        RawValue::Number(n) => Ok(n.to_string()),
        RawValue::Bool(b) => Ok(b.to_string()),
        RawValue::Null => Ok("null".to_string()),
        other @ (RawValue::Sequence(_) | RawValue::Mapping(_)) => {
            Err(FormatError::KeyTypeMismatch { found: other.kind() })
        }
    }
}
