// Rust guideline compliant 2026-10-12

//! Typed metadata bags attached to payments and lifecycle events.
//!
//! Values are restricted to strings, numbers, booleans and nested maps so that
//! merges are checked by the type system rather than by convention.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    String(String),
    /// Nested map.
    Map(Metadata),
}

impl MetaValue {
    /// Returns the string content if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the numeric content if this is a `Number` value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the nested map if this is a `Map` value.
    pub fn as_map(&self) -> Option<&Metadata> {
        match self {
            MetaValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::String(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Number(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Number(value as f64)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<Metadata> for MetaValue {
    fn from(value: Metadata) -> Self {
        MetaValue::Map(value)
    }
}

/// Ordered key/value metadata bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    /// Creates an empty metadata bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the bag has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over top-level entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, MetaValue> {
        self.0.iter()
    }

    /// Merges `other` into `self` without discarding unrelated keys.
    ///
    /// Keys present in both bags take the incoming value, except when both
    /// values are maps, in which case the maps are merged recursively.
    pub fn merge(&mut self, other: Metadata) {
        for (key, incoming) in other.0 {
            match (self.0.get_mut(&key), incoming) {
                (Some(MetaValue::Map(existing)), MetaValue::Map(nested)) => {
                    existing.merge(nested);
                }
                (_, incoming) => {
                    self.0.insert(key, incoming);
                }
            }
        }
    }

    /// Returns a copy of `self` with `other` merged in.
    #[must_use]
    pub fn merged(mut self, other: Metadata) -> Self {
        self.merge(other);
        self
    }
}

impl<K: Into<String>, V: Into<MetaValue>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Metadata {
    type Item = (String, MetaValue);
    type IntoIter = btree_map::IntoIter<String, MetaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unrelated_keys() {
        let mut base = Metadata::new().with("order_id", "ord-1").with("source", "gateway");
        base.merge(Metadata::new().with("escrow_action", "hold"));

        assert_eq!(base.len(), 3);
        assert_eq!(base.get("order_id").and_then(MetaValue::as_str), Some("ord-1"));
        assert_eq!(base.get("escrow_action").and_then(MetaValue::as_str), Some("hold"));
    }

    #[test]
    fn test_merge_nested_maps_recursively() {
        let mut base = Metadata::new().with("escrow", Metadata::new().with("hold", 10i64));
        base.merge(Metadata::new().with("escrow", Metadata::new().with("release", 20i64)));

        let escrow = base.get("escrow").and_then(MetaValue::as_map).unwrap();
        assert!(escrow.contains_key("hold"));
        assert!(escrow.contains_key("release"));
    }

    #[test]
    fn test_json_shape_is_plain_object() {
        let meta = Metadata::new()
            .with("paid", true)
            .with("amount", 450.0)
            .with("note", "cash");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "amount": 450.0, "note": "cash", "paid": true })
        );

        let back: Metadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
