//! Store configuration

use crate::distance::DistanceMetric;
use serde::{Deserialize, Serialize};

/// Configuration for a [`VectorStore`](crate::storage::VectorStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Metric used by searches that don't name one.
    pub default_metric: DistanceMetric,
    /// Score candidates on the rayon pool once there are at least this many.
    pub parallel_threshold: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_metric: DistanceMetric::Cosine,
            parallel_threshold: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"default_metric": "manhattan"}"#).unwrap();
        assert_eq!(config.default_metric, DistanceMetric::Manhattan);
        assert_eq!(config.parallel_threshold, 1024);
    }
}
