//! Structured message values.
//!
//! [`Value`] is the closed set of shapes a message may take before it is
//! sealed: the JSON data model plus raw byte sequences for attachments.
//! Byte sequences travel as a single-entry object `{"$bytes": "<base64>"}`,
//! and that shape is reserved: a [`Value::Map`] that would be
//! indistinguishable from it refuses to serialize. Nesting is capped at
//! [`MAX_DEPTH`] for the same reason, so every value that serializes
//! successfully comes back identical.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{self, SerializeMap, SerializeSeq},
};
pub use serde_json::Number;

/// Object key that marks an encoded byte sequence
pub const BYTES_KEY: &str = "$bytes";

/// Deepest nesting of lists, maps and byte sequences that serializes.
///
/// The JSON decoder stops at 128 open containers, so anything deeper would
/// encrypt and then never decrypt. Byte sequences count because they travel
/// as an object.
pub const MAX_DEPTH: usize = 127;

/// A message payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// JSON `null`
    #[default]
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, keeping integers exact
    Number(Number),
    /// UTF-8 text
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// String-keyed mapping in insertion order
    Map(Vec<(String, Value)>),
    /// Raw bytes (attachments, binary bodies)
    Bytes(Vec<u8>),
}

impl Value {
    /// Build a map from key/value pairs.
    ///
    /// A repeated key replaces the earlier value but keeps its position.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut map = Self::Map(Vec::new());
        for (key, value) in entries {
            map.insert(key, value);
        }
        map
    }

    /// Wrap a byte sequence.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Insert into a map, replacing any existing entry with the same key.
    ///
    /// Returns the previous value. Does nothing and returns `None` if this
    /// value is not a map.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let Self::Map(entries) = self else {
            return None;
        };

        let key = key.into();
        if let Some((_, slot)) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        entries.push((key, value));
        None
    }

    /// Look up a key if this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Text content if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Byte content if this value is a byte sequence.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// True for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

/// A map that would decode as [`Value::Bytes`].
fn is_reserved_shape(entries: &[(String, Value)]) -> bool {
    matches!(entries, [(key, Value::String(_))] if key == BYTES_KEY)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Nested { value: self, depth: 0 }.serialize(serializer)
    }
}

/// A value together with the number of containers enclosing it.
struct Nested<'a> {
    value: &'a Value,
    depth: usize,
}

impl Nested<'_> {
    fn child<'b>(&self, value: &'b Value) -> Nested<'b> {
        Nested { value, depth: self.depth + 1 }
    }
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let is_container = matches!(self.value, Value::List(_) | Value::Map(_) | Value::Bytes(_));
        if is_container && self.depth >= MAX_DEPTH {
            return Err(ser::Error::custom(format!(
                "value nests deeper than {MAX_DEPTH} levels"
            )));
        }

        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            },
            Value::Map(entries) => {
                if is_reserved_shape(entries) {
                    return Err(ser::Error::custom(format!(
                        "a map holding only a string under {BYTES_KEY:?} is reserved for byte sequences"
                    )));
                }

                let mut seen = HashSet::with_capacity(entries.len());
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    if !seen.insert(key.as_str()) {
                        return Err(ser::Error::custom(format!("duplicate map key {key:?}")));
                    }
                    map.serialize_entry(key, &self.child(value))?;
                }
                map.end()
            },
            Value::Bytes(bytes) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(BYTES_KEY, &BASE64.encode(bytes))?;
                map.end()
            },
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Number::from_f64(v).map(Value::Number).ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut entries: Vec<(String, Value)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        // Last duplicate wins, at the position of the first occurrence
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            if let Some(&index) = positions.get(&key) {
                entries[index].1 = value;
            } else {
                positions.insert(key.clone(), entries.len());
                entries.push((key, value));
            }
        }

        if let [(key, Value::String(encoded))] = entries.as_slice()
            && key == BYTES_KEY
        {
            let bytes = BASE64.decode(encoded).map_err(|e| {
                <A::Error as de::Error>::custom(format!("invalid {BYTES_KEY} payload: {e}"))
            })?;
            return Ok(Value::Bytes(bytes));
        }

        Ok(Value::Map(entries))
    }
}
