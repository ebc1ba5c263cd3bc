//! Similarity metrics for comparing embeddings.
//!
//! Every metric is oriented so that a higher score means "more similar".
//! Distance-style metrics (euclidean, manhattan, minkowski, chebyshev) are
//! negated for that reason; callers that want the raw distance should use
//! [`DistanceMetric::distance`] instead of flipping the sign themselves.

use crate::error::{Result, VectorDbError};
use crate::vector::{dot, norm, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exponent used by the minkowski metric.
pub const MINKOWSKI_P: f64 = 3.0;

/// Components strictly above this value count as set bits for jaccard.
pub const JACCARD_THRESHOLD: f64 = 0.5;

/// The catalog of similarity metrics a store can rank by
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// dot(a, b) / (|a| * |b|), 0.0 when either norm is zero
    #[default]
    Cosine,
    /// Negated L2 distance
    Euclidean,
    /// Negated L1 distance
    Manhattan,
    /// Raw dot product, sensitive to magnitude
    DotProduct,
    /// Negated Minkowski distance with p = 3
    Minkowski,
    /// Negated L-infinity distance
    Chebyshev,
    /// Pearson correlation, computed as cosine of mean-centered vectors
    Correlation,
    /// Jaccard index of the vectors binarized at 0.5
    Jaccard,
}

impl DistanceMetric {
    /// All registered metrics, in catalog order.
    pub const ALL: [DistanceMetric; 8] = [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Manhattan,
        DistanceMetric::DotProduct,
        DistanceMetric::Minkowski,
        DistanceMetric::Chebyshev,
        DistanceMetric::Correlation,
        DistanceMetric::Jaccard,
    ];

    /// The registry name of this metric
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::DotProduct => "dot_product",
            DistanceMetric::Minkowski => "minkowski",
            DistanceMetric::Chebyshev => "chebyshev",
            DistanceMetric::Correlation => "correlation",
            DistanceMetric::Jaccard => "jaccard",
        }
    }

    /// Names of every registered metric
    pub fn available_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.name()).collect()
    }

    /// Resolve a metric by its registry name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == name)
            .ok_or_else(|| VectorDbError::UnknownMetric {
                name: name.to_string(),
                available: Self::available_names().join(", "),
            })
    }

    /// Whether this metric is a negated distance rather than a native similarity.
    pub fn is_negated_distance(&self) -> bool {
        matches!(
            self,
            DistanceMetric::Euclidean
                | DistanceMetric::Manhattan
                | DistanceMetric::Minkowski
                | DistanceMetric::Chebyshev
        )
    }

    /// Score two vectors, higher = more similar.
    pub fn similarity(&self, v1: &Vector, v2: &Vector) -> Result<f64> {
        if !v1.has_same_dimension(v2) {
            return Err(VectorDbError::DimensionMismatch {
                key: None,
                expected: v1.dimension(),
                actual: v2.dimension(),
            });
        }
        Ok(self.score_slices(v1.as_slice(), v2.as_slice()))
    }

    /// The raw, non-negated distance for distance-style metrics, for display.
    /// Returns `None` for metrics that are natively similarities.
    pub fn distance(&self, v1: &Vector, v2: &Vector) -> Result<Option<f64>> {
        let score = self.similarity(v1, v2)?;
        Ok(self.is_negated_distance().then_some(-score))
    }

    /// Score two slices already known to have equal length.
    pub(crate) fn score_slices(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::Euclidean => -euclidean_distance(a, b),
            DistanceMetric::Manhattan => -manhattan_distance(a, b),
            DistanceMetric::DotProduct => dot(a, b),
            DistanceMetric::Minkowski => -minkowski_distance(a, b, MINKOWSKI_P),
            DistanceMetric::Chebyshev => -chebyshev_distance(a, b),
            DistanceMetric::Correlation => correlation_similarity(a, b),
            DistanceMetric::Jaccard => jaccard_similarity(a, b, JACCARD_THRESHOLD),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Cosine similarity, 0.0 if either vector has zero norm
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // Clamp to [-1, 1] to absorb floating point error
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Euclidean (L2) distance
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Manhattan (L1) distance
pub fn manhattan_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Minkowski distance of order `p`
pub fn minkowski_distance(a: &[f64], b: &[f64], p: f64) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs().powf(p))
        .sum::<f64>()
        .powf(1.0 / p)
}

/// Chebyshev (L-infinity) distance
pub fn chebyshev_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Pearson correlation via cosine of the mean-centered inputs
pub fn correlation_similarity(a: &[f64], b: &[f64]) -> f64 {
    let a = Vector::new(a.to_vec()).centered();
    let b = Vector::new(b.to_vec()).centered();
    cosine_similarity(a.as_slice(), b.as_slice())
}

/// Jaccard index of the two vectors binarized at `threshold`
pub fn jaccard_similarity(a: &[f64], b: &[f64], threshold: f64) -> f64 {
    let (intersection, union) =
        a.iter()
            .zip(b.iter())
            .fold((0usize, 0usize), |(inter, uni), (x, y)| {
                let (x, y) = (*x > threshold, *y > threshold);
                (inter + (x && y) as usize, uni + (x || y) as usize)
            });

    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
