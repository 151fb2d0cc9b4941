//! Format-neutral value model
//!
//!     Every conversion decodes into a [`RawValue`], normalizes it into a [`Value`] and
//!     encodes from there. The two types differ only in their mapping keys:
//!
//!     - [`RawValue`] keeps whatever key a decoder produced (YAML happily yields integer,
//!       boolean or even mapping keys), as an ordered list of pairs.
//!     - [`Value`] only has string keys, stored in a [`BTreeMap`] so iteration is sorted and
//!       every encoder produces deterministic output.
//!
//!     `RawValue` implements `Deserialize` and `Value` implements `Serialize`, so any
//!     self-describing serde format can be plugged into the registry without glue code.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// String-keyed mapping with sorted iteration.
pub type Mapping = BTreeMap<String, Value>;

/// A number as decoded by the source format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    /// Only used for values above `i64::MAX`.
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn from_u64(value: u64) -> Self {
        i64::try_from(value).map_or(Number::UInt(value), Number::Int)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::UInt(v) => write!(f, "{v}"),
            // f64's Display is the shortest representation that round-trips
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(v) => serializer.serialize_i64(v),
            Number::UInt(v) => serializer.serialize_u64(v),
            Number::Float(v) => serializer.serialize_f64(v),
        }
    }
}

/// Normalized value: every mapping is string-keyed, at every depth.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// True for mappings and sequences.
    pub fn is_structured(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Text form of a scalar; `None` for mappings and sequences.
    ///
    /// Null renders as the empty string.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => serializer.collect_seq(items),
            Value::Mapping(map) => serializer.collect_map(map),
        }
    }
}

/// Value exactly as a decoder produced it, before key normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<RawValue>),
    /// Pairs in source order; keys may be of any kind.
    Mapping(Vec<(RawValue, RawValue)>),
}

impl RawValue {
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Sequence(_) => "sequence",
            RawValue::Mapping(_) => "mapping",
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => RawValue::Number(n),
            Value::String(s) => RawValue::String(s),
            Value::Sequence(items) => {
                RawValue::Sequence(items.into_iter().map(RawValue::from).collect())
            }
            Value::Mapping(map) => RawValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (RawValue::String(k), RawValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// TOML datetimes have no counterpart in the value model and become strings.
impl From<toml::Value> for RawValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => RawValue::String(s),
            toml::Value::Integer(i) => RawValue::Number(Number::Int(i)),
            toml::Value::Float(f) => RawValue::Number(Number::Float(f)),
            toml::Value::Boolean(b) => RawValue::Bool(b),
            toml::Value::Datetime(dt) => RawValue::String(dt.to_string()),
            toml::Value::Array(items) => {
                RawValue::Sequence(items.into_iter().map(RawValue::from).collect())
            }
            toml::Value::Table(table) => RawValue::Mapping(
                table
                    .into_iter()
                    .map(|(k, v)| (RawValue::String(k), RawValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a null, bool, number, string, sequence or mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawValue, E> {
        Ok(RawValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawValue, E> {
        Ok(RawValue::Number(Number::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawValue, E> {
        Ok(RawValue::Number(Number::from_u64(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawValue, E> {
        Ok(RawValue::Number(Number::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawValue, E> {
        Ok(RawValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawValue, E> {
        Ok(RawValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawValue, D::Error> {
        RawValue::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<RawValue, D::Error> {
        RawValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RawValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawValue, A::Error> {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(pair) = map.next_entry::<RawValue, RawValue>()? {
            pairs.push(pair);
        }
        Ok(RawValue::Mapping(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Int(-42).to_string(), "-42");
        assert_eq!(Number::UInt(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(Number::Float(1.5).to_string(), "1.5");
        assert_eq!(Number::Float(3.0).to_string(), "3");
        assert_eq!(Number::Float(0.1).to_string(), "0.1");
    }

    #[test]
    fn test_from_u64_prefers_int() {
        assert_eq!(Number::from_u64(7), Number::Int(7));
        assert_eq!(Number::from_u64(u64::MAX), Number::UInt(u64::MAX));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(Value::Null.scalar_text().as_deref(), Some(""));
        assert_eq!(Value::Bool(true).scalar_text().as_deref(), Some("true"));
        assert_eq!(Value::from(12).scalar_text().as_deref(), Some("12"));
        assert_eq!(Value::from("x").scalar_text().as_deref(), Some("x"));
        assert_eq!(Value::Sequence(vec![]).scalar_text(), None);
    }

    #[test]
    fn test_raw_value_keeps_non_string_keys() {
        let raw: RawValue = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        assert_eq!(
            raw,
            RawValue::Mapping(vec![
                (
                    RawValue::Number(Number::Int(1)),
                    RawValue::String("one".into())
                ),
                (RawValue::Bool(true), RawValue::String("yes".into())),
            ])
        );
    }

    #[test]
    fn test_raw_value_from_json() {
        let raw: RawValue = serde_json::from_str(r#"{"a":[1,2.5,null,"x"]}"#).unwrap();
        let RawValue::Mapping(pairs) = raw else {
            panic!("expected mapping");
        };
        assert_eq!(pairs[0].0, RawValue::String("a".into()));
        assert_eq!(
            pairs[0].1,
            RawValue::Sequence(vec![
                RawValue::Number(Number::Int(1)),
                RawValue::Number(Number::Float(2.5)),
                RawValue::Null,
                RawValue::String("x".into()),
            ])
        );
    }

    #[test]
    fn test_toml_datetime_becomes_string() {
        let table: toml::Value = toml::from_str("when = 1979-05-27T07:32:00Z").unwrap();
        let RawValue::Mapping(pairs) = RawValue::from(table) else {
            panic!("expected mapping");
        };
        assert_eq!(pairs[0].1, RawValue::String("1979-05-27T07:32:00Z".into()));
    }

    #[test]
    fn test_value_serializes_sorted() {
        let mut map = Mapping::new();
        map.insert("b".into(), Value::from(2));
        map.insert("a".into(), Value::from(1));
        let json = serde_json::to_string(&Value::Mapping(map)).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2}"#);
    }
}
