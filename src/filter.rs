//! Metadata filtering for search queries.
//!
//! A [`Filter`] maps field names to conditions; every condition must hold for a
//! record to match. Supported conditions:
//!
//! - exact match: `{"source": "paper.pdf"}`
//! - membership: `{"source": ["a.pdf", "b.pdf"]}`
//! - comparisons: `{"page": {"gte": 10, "lte": 20}}`, operators `gte`, `lte`,
//!   `gt`, `lt`, `ne` (a leading `$` is accepted, e.g. `$gte`)
//!
//! A field named in the filter but missing from a record never matches.

use crate::error::{Result, VectorDbError};
use crate::metadata::{Metadata, MetadataValue};
use indexmap::IndexMap;
use serde::Deserialize;
use std::cmp::Ordering;

/// A conjunction of per-field conditions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Metadata")]
pub struct Filter {
    conditions: IndexMap<String, Condition>,
}

/// The test applied to a single metadata field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the scalar
    Equals(MetadataValue),
    /// Field equals one of the scalars
    OneOf(Vec<MetadataValue>),
    /// Every supplied bound holds
    Compare(Comparison),
}

/// Comparison bounds for one field, implicitly AND-ed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub gte: Option<MetadataValue>,
    pub lte: Option<MetadataValue>,
    pub gt: Option<MetadataValue>,
    pub lt: Option<MetadataValue>,
    pub ne: Option<MetadataValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VectorDbError::InvalidFilter(e.to_string()))
    }

    /// Add (or replace) the condition for `field`.
    pub fn with(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.insert(field.into(), condition);
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.with(field, Condition::Equals(value.into()))
    }

    pub fn one_of<V: Into<MetadataValue>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.with(
            field,
            Condition::OneOf(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn compare(self, field: impl Into<String>, comparison: Comparison) -> Self {
        self.with(field, Condition::Compare(comparison))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.conditions.keys()
    }

    /// Check whether a record's metadata satisfies every condition.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| match metadata.get(field) {
                Some(value) => condition.matches(value),
                None => false,
            })
    }
}

/// Check if a record's metadata matches the given filter.
pub fn matches(metadata: &Metadata, filter: &Filter) -> bool {
    filter.matches(metadata)
}

impl Condition {
    pub fn matches(&self, value: &MetadataValue) -> bool {
        match self {
            Condition::Equals(expected) => value == expected,
            Condition::OneOf(options) => options.iter().any(|o| o == value),
            Condition::Compare(comparison) => comparison.matches(value),
        }
    }
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gte(mut self, bound: impl Into<MetadataValue>) -> Self {
        self.gte = Some(bound.into());
        self
    }

    pub fn lte(mut self, bound: impl Into<MetadataValue>) -> Self {
        self.lte = Some(bound.into());
        self
    }

    pub fn gt(mut self, bound: impl Into<MetadataValue>) -> Self {
        self.gt = Some(bound.into());
        self
    }

    pub fn lt(mut self, bound: impl Into<MetadataValue>) -> Self {
        self.lt = Some(bound.into());
        self
    }

    pub fn ne(mut self, value: impl Into<MetadataValue>) -> Self {
        self.ne = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.gte.is_none()
            && self.lte.is_none()
            && self.gt.is_none()
            && self.lt.is_none()
            && self.ne.is_none()
    }

    /// Ordering bounds fail when the value and bound are not comparable.
    pub fn matches(&self, value: &MetadataValue) -> bool {
        let holds = |bound: &Option<MetadataValue>, accept: fn(Ordering) -> bool| match bound {
            Some(bound) => value.compare(bound).is_some_and(accept),
            None => true,
        };

        holds(&self.gte, Ordering::is_ge)
            && holds(&self.lte, Ordering::is_le)
            && holds(&self.gt, Ordering::is_gt)
            && holds(&self.lt, Ordering::is_lt)
            && self.ne.as_ref().map_or(true, |ne| value != ne)
    }

    fn set(&mut self, op: &str, bound: MetadataValue) -> Result<()> {
        if !bound.is_scalar() {
            return Err(VectorDbError::InvalidFilter(format!(
                "operator '{op}' needs a scalar bound, got {bound}"
            )));
        }
        let slot = match op.strip_prefix('$').unwrap_or(op) {
            "gte" => &mut self.gte,
            "lte" => &mut self.lte,
            "gt" => &mut self.gt,
            "lt" => &mut self.lt,
            "ne" => &mut self.ne,
            other => {
                return Err(VectorDbError::InvalidFilter(format!(
                    "unknown comparison operator '{other}'"
                )))
            }
        };
        *slot = Some(bound);
        Ok(())
    }
}

impl TryFrom<MetadataValue> for Condition {
    type Error = VectorDbError;

    fn try_from(value: MetadataValue) -> Result<Self> {
        match value {
            MetadataValue::List(options) => {
                if let Some(bad) = options.iter().find(|o| !o.is_scalar()) {
                    return Err(VectorDbError::InvalidFilter(format!(
                        "membership lists may only hold scalars, got {bad}"
                    )));
                }
                Ok(Condition::OneOf(options))
            }
            MetadataValue::Map(ops) => {
                let mut comparison = Comparison::new();
                for (op, bound) in ops {
                    comparison.set(&op, bound)?;
                }
                if comparison.is_empty() {
                    return Err(VectorDbError::InvalidFilter(
                        "comparison object has no operators".to_string(),
                    ));
                }
                Ok(Condition::Compare(comparison))
            }
            scalar => Ok(Condition::Equals(scalar)),
        }
    }
}

impl TryFrom<Metadata> for Filter {
    type Error = VectorDbError;

    fn try_from(raw: Metadata) -> Result<Self> {
        let conditions = raw
            .into_iter()
            .map(|(field, value)| Ok((field, Condition::try_from(value)?)))
            .collect::<Result<IndexMap<_, _>>>()?;
        Ok(Self { conditions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(page: i64) -> Metadata {
        Metadata::new()
            .with("source", "paper.pdf")
            .with("page", page)
            .with("author", "Lewis")
    }

    #[test]
    fn test_exact_match() {
        let filter = Filter::new().eq("source", "paper.pdf");
        assert!(filter.matches(&paper(1)));
        assert!(!Filter::new().eq("source", "blog.txt").matches(&paper(1)));
    }

    #[test]
    fn test_exact_match_numeric_across_int_and_float() {
        assert!(Filter::new().eq("page", 3.0).matches(&paper(3)));
    }

    #[test]
    fn test_missing_field_fails_closed() {
        let filter = Filter::new().eq("source", "paper.pdf").eq("year", 2020);
        assert!(!filter.matches(&paper(1)));

        let ne_only = Filter::new().compare("year", Comparison::new().ne(2020));
        assert!(!ne_only.matches(&paper(1)));
    }

    #[test]
    fn test_membership() {
        let filter = Filter::new().one_of("source", ["a.pdf", "paper.pdf"]);
        assert!(filter.matches(&paper(1)));
        let filter = Filter::new().one_of("source", ["a.pdf", "b.pdf"]);
        assert!(!filter.matches(&paper(1)));
    }

    #[test]
    fn test_range_is_conjunctive() {
        let filter = Filter::new().compare("page", Comparison::new().gte(10).lte(20));
        assert!(filter.matches(&paper(10)));
        assert!(filter.matches(&paper(20)));
        assert!(!filter.matches(&paper(9)));
        assert!(!filter.matches(&paper(21)));

        let strict = Filter::new().compare("page", Comparison::new().gt(10).lt(12).ne(11));
        assert!(!strict.matches(&paper(10)));
        assert!(!strict.matches(&paper(11)));
        assert!(!strict.matches(&paper(12)));
    }

    #[test]
    fn test_incomparable_types_fail_ordering_but_pass_ne() {
        let filter = Filter::new().compare("source", Comparison::new().gte(1));
        assert!(!filter.matches(&paper(1)));
        let filter = Filter::new().compare("source", Comparison::new().ne(1));
        assert!(filter.matches(&paper(1)));
    }

    #[test]
    fn test_string_ranges_are_lexicographic() {
        let metadata = Metadata::new().with("timestamp", "2024-03-01T10:00:00");
        let filter = Filter::new().compare("timestamp", Comparison::new().gte("2024-01-01"));
        assert!(filter.matches(&metadata));
    }

    #[test]
    fn test_parse_json() {
        let filter = Filter::from_json(
            r#"{"source": ["paper.pdf", "b.pdf"], "page": {"$gte": 2, "lt": 5}, "author": "Lewis"}"#,
        )
        .unwrap();
        assert_eq!(filter.fields().count(), 3);
        assert!(filter.matches(&paper(2)));
        assert!(!filter.matches(&paper(5)));
    }

    #[test]
    fn test_parse_rejects_unknown_operator_and_empty_object() {
        assert!(matches!(
            Filter::from_json(r#"{"page": {"$regex": "x"}}"#),
            Err(VectorDbError::InvalidFilter(_))
        ));
        assert!(matches!(
            Filter::from_json(r#"{"page": {}}"#),
            Err(VectorDbError::InvalidFilter(_))
        ));
        assert!(matches!(
            Filter::from_json(r#"{"page": [[1]]}"#),
            Err(VectorDbError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&Metadata::new()));
    }
}
