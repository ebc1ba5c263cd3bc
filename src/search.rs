//! Brute-force top-k search over the store

use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::filter::Filter;
use crate::metadata::Metadata;
use crate::storage::{VectorRecord, VectorStore};
use crate::vector::Vector;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// A search hit: owned copies of the key and metadata plus the score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub key: String,
    /// Higher = more similar, whatever the metric
    pub score: f64,
    pub metadata: Metadata,
}

impl SearchResult {
    /// Drop the score, keeping `(key, metadata)`.
    pub fn into_pair(self) -> (String, Metadata) {
        (self.key, self.metadata)
    }
}

/// Descending by score. NaN sorts last; equal scores compare `Equal` so a
/// stable sort keeps store order among ties.
fn by_score_descending(a: f64, b: f64) -> Ordering {
    let rank = |s: f64| if s.is_nan() { f64::NEG_INFINITY } else { s };
    rank(b).partial_cmp(&rank(a)).unwrap_or(Ordering::Equal)
}

impl VectorStore {
    /// Search for the `k` most similar records.
    ///
    /// Candidates are restricted by `filter` (if given), scored with `metric`
    /// (or the store's active metric), sorted by descending score and
    /// truncated to `k`. Records with equal scores keep store iteration order.
    ///
    /// `k == 0` and an empty store both yield an empty result. Any candidate
    /// whose dimension differs from the query fails the whole search with
    /// [`VectorDbError::DimensionMismatch`] naming the first such key.
    pub fn search(
        &self,
        query: &Vector,
        k: usize,
        metric: Option<DistanceMetric>,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 || self.is_empty() {
            return Ok(vec![]);
        }

        let metric = metric.unwrap_or(self.metric);
        let candidates: Vec<(&String, &VectorRecord)> = self
            .records
            .iter()
            .filter(|(_, record)| filter.map_or(true, |f| f.matches(&record.metadata)))
            .collect();

        for (key, record) in &candidates {
            if !record.vector.has_same_dimension(query) {
                return Err(VectorDbError::DimensionMismatch {
                    key: Some((*key).clone()),
                    expected: query.dimension(),
                    actual: record.vector.dimension(),
                });
            }
        }

        let query = query.as_slice();
        let scores: Vec<f64> = if candidates.len() >= self.config.parallel_threshold {
            candidates
                .par_iter()
                .map(|(_, record)| metric.score_slices(query, record.vector.as_slice()))
                .collect()
        } else {
            candidates
                .iter()
                .map(|(_, record)| metric.score_slices(query, record.vector.as_slice()))
                .collect()
        };

        let candidate_count = candidates.len();
        let mut scored: Vec<(&String, &VectorRecord, f64)> = candidates
            .into_iter()
            .zip(scores)
            .map(|((key, record), score)| (key, record, score))
            .collect();

        scored.sort_by(|a, b| by_score_descending(a.2, b.2));
        scored.truncate(k);
        debug!(
            metric = %metric,
            candidates = candidate_count,
            returned = scored.len(),
            "search complete"
        );

        Ok(scored
            .into_iter()
            .map(|(key, record, score)| SearchResult {
                key: key.clone(),
                score,
                metadata: record.metadata.clone(),
            })
            .collect())
    }

    /// Embed `query_text` with the attached provider, then [`search`](Self::search).
    pub async fn search_by_text(
        &self,
        query_text: &str,
        k: usize,
        metric: Option<DistanceMetric>,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        let embedder = self.require_embedder()?;
        let query = embedder.embed_one(query_text).await?;
        self.search(&query, k, metric, filter)
    }

    /// Like [`search_by_text`](Self::search_by_text), returning only `(key, metadata)`.
    pub async fn search_by_text_pairs(
        &self,
        query_text: &str,
        k: usize,
        metric: Option<DistanceMetric>,
        filter: Option<&Filter>,
    ) -> Result<Vec<(String, Metadata)>> {
        let results = self.search_by_text(query_text, k, metric, filter).await?;
        Ok(results.into_iter().map(SearchResult::into_pair).collect())
    }
}
