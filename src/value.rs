//! JSON value model
//!
//! A closed tagged union covering every JSON value kind plus an `Invalid`
//! sentinel for parse failures. Pure data: the decoder builds these trees,
//! the encoder walks them, callers pattern-match on them.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Object map type used by [`JsonValue::Object`].
///
/// A `BTreeMap` keeps encoder output deterministic; key order in JSON
/// output is unspecified, so sorted order is as good as any.
pub type JsonMap = BTreeMap<String, JsonValue>;

/// A JSON value tree.
///
/// `Invalid` marks a parse failure and is distinct from `Null` (the JSON
/// `null` literal). A successfully decoded `Array` or `Object` never
/// contains a nested `Invalid`: a failed subtree poisons the whole value.
/// `Invalid` is not serializable.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonValue {
    /// Ordered sequence of values
    Array(Vec<JsonValue>),
    /// String-keyed mapping; duplicate keys resolve last-write-wins
    Object(JsonMap),
    /// Text
    String(String),
    /// 64-bit floating point number
    Number(f64),
    /// `true` or `false`
    Boolean(bool),
    /// The `null` literal
    Null,
    /// Sentinel for a failed parse; never nested inside a valid tree
    Invalid,
}

impl Default for JsonValue {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for JsonValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for JsonValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        Self::String(String::from(v))
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(v: Vec<JsonValue>) -> Self {
        Self::Array(v)
    }
}

impl From<JsonMap> for JsonValue {
    fn from(v: JsonMap) -> Self {
        Self::Object(v)
    }
}

impl JsonValue {
    /// Returns `true` for the `Null` variant.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for the `Invalid` sentinel.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract the number payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract the boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the element list, if this is an array.
    pub fn as_array(&self) -> Option<&Vec<JsonValue>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow the key/value map, if this is an object.
    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Look up a key in an object value. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|o| o.get(key))
    }
}
