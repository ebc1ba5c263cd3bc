//! Open-schema metadata attached to each stored record

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Field stamped with the record's creation time on insert.
pub const TIMESTAMP_FIELD: &str = "timestamp";
/// Field stamped with the vector length on insert.
pub const VECTOR_DIM_FIELD: &str = "vector_dim";
/// Field stamped with the store's active metric name on insert.
pub const DISTANCE_METRIC_FIELD: &str = "distance_metric";
/// Field stamped whenever metadata is updated after insert.
pub const LAST_UPDATED_FIELD: &str = "last_updated";
/// Positional index stamped on records created by a batch build.
pub const INDEX_FIELD: &str = "index";
/// Field whose distinct values are reported in store statistics.
pub const SOURCE_FIELD: &str = "source";

/// Fields the store populates on insert.
pub const RESERVED_FIELDS: [&str; 3] = [TIMESTAMP_FIELD, VECTOR_DIM_FIELD, DISTANCE_METRIC_FIELD];

/// A single metadata value.
///
/// Numbers keep their integer/float distinction for serialization, but compare
/// numerically: `Integer(3) == Float(3.0)`. Booleans never equal numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<MetadataValue>),
    Map(IndexMap<String, MetadataValue>),
}

impl MetadataValue {
    /// Numeric view of integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Integer(i) => Some(*i as f64),
            MetadataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Strings, numbers, booleans and null
    pub fn is_scalar(&self) -> bool {
        !matches!(self, MetadataValue::List(_) | MetadataValue::Map(_))
    }

    /// Ordering between two values, defined only for number/number and
    /// string/string pairs.
    pub fn compare(&self, other: &MetadataValue) -> Option<Ordering> {
        match (self, other) {
            (MetadataValue::Integer(a), MetadataValue::Integer(b)) => Some(a.cmp(b)),
            (MetadataValue::String(a), MetadataValue::String(b)) => Some(a.cmp(b)),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetadataValue::Null, MetadataValue::Null) => true,
            (MetadataValue::Bool(a), MetadataValue::Bool(b)) => a == b,
            (MetadataValue::Integer(a), MetadataValue::Integer(b)) => a == b,
            (MetadataValue::String(a), MetadataValue::String(b)) => a == b,
            (MetadataValue::List(a), MetadataValue::List(b)) => a == b,
            (MetadataValue::Map(a), MetadataValue::Map(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => f.write_str(s),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<i32> for MetadataValue {
    fn from(i: i32) -> Self {
        MetadataValue::Integer(i as i64)
    }
}

impl From<usize> for MetadataValue {
    fn from(i: usize) -> Self {
        MetadataValue::Integer(i as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(f: f64) -> Self {
        MetadataValue::Float(f)
    }
}

impl<T: Into<MetadataValue>> From<Vec<T>> for MetadataValue {
    fn from(items: Vec<T>) -> Self {
        MetadataValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Metadata> for MetadataValue {
    fn from(metadata: Metadata) -> Self {
        MetadataValue::Map(metadata.fields)
    }
}

/// Metadata associated with a stored vector, in field insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Metadata {
    fields: IndexMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Set a field, returning the previous value if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Builder-style [`Metadata::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.fields.shift_remove(key)
    }

    /// Overwrite fields with those of `other`, appending new ones.
    pub fn merge(&mut self, other: Metadata) {
        self.fields.extend(other.fields);
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<MetadataValue>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Metadata {
    type Item = (String, MetadataValue);
    type IntoIter = indexmap::map::IntoIter<String, MetadataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(MetadataValue::Integer(3), MetadataValue::Float(3.0));
        assert_ne!(MetadataValue::Integer(1), MetadataValue::Bool(true));
        assert_eq!(
            MetadataValue::Integer(2).compare(&MetadataValue::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            MetadataValue::from("b").compare(&MetadataValue::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(MetadataValue::from("1").compare(&MetadataValue::Integer(1)), None);
    }

    #[test]
    fn test_untagged_json_shape() {
        let json = r#"{"source":"a.pdf","page":3,"score":0.5,"draft":false,"tags":["x"],"extra":null,"nested":{"k":1}}"#;
        let metadata: Metadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.get("page"), Some(&MetadataValue::Integer(3)));
        assert!(matches!(metadata.get("score"), Some(MetadataValue::Float(_))));
        assert_eq!(metadata.get("draft"), Some(&MetadataValue::Bool(false)));
        assert_eq!(metadata.get("extra"), Some(&MetadataValue::Null));
        assert!(matches!(metadata.get("nested"), Some(MetadataValue::Map(_))));
        assert_eq!(serde_json::to_string(&metadata).unwrap(), json);
    }

    #[test]
    fn test_merge_overwrites_and_appends() {
        let mut base = Metadata::new().with("a", 1).with("b", "old");
        base.merge(Metadata::new().with("b", "new").with("c", true));
        let keys: Vec<_> = base.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(base.get("b"), Some(&MetadataValue::from("new")));
    }

    #[test]
    fn test_display() {
        assert_eq!(MetadataValue::from("paper.pdf").to_string(), "paper.pdf");
        assert_eq!(MetadataValue::Integer(7).to_string(), "7");
        assert_eq!(MetadataValue::from(vec![1, 2]).to_string(), "[1,2]");
    }
}
