//! In-memory record storage

use crate::config::StoreConfig;
use crate::distance::DistanceMetric;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, VectorDbError};
use crate::metadata::{
    Metadata, MetadataValue, DISTANCE_METRIC_FIELD, INDEX_FIELD, LAST_UPDATED_FIELD,
    RESERVED_FIELDS, SOURCE_FIELD, TIMESTAMP_FIELD, VECTOR_DIM_FIELD,
};
use crate::vector::Vector;
use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A stored vector and its metadata. The vector is fixed once inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub(crate) vector: Vector,
    pub(crate) metadata: Metadata,
}

impl VectorRecord {
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Summary of a store's contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_vectors: usize,
    pub distance_metric: DistanceMetric,
    pub available_metrics: Vec<String>,
    /// Union of metadata field names across all records
    pub metadata_fields: BTreeSet<String>,
    /// Distinct values of the `source` field, in first-seen order
    pub unique_sources: Vec<MetadataValue>,
    /// Dimension of the first record, 0 when empty
    pub vector_dimensions: usize,
}

/// In-memory vector store keyed by text (or caller-supplied id).
///
/// Records iterate in first-insertion order; re-inserting a key replaces the
/// record in place. Search ties are broken by this order.
#[derive(Clone)]
pub struct VectorStore {
    pub(crate) records: IndexMap<String, VectorRecord>,
    pub(crate) metric: DistanceMetric,
    pub(crate) config: StoreConfig,
    pub(crate) embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl VectorStore {
    /// Create an empty store ranking by `metric` by default.
    pub fn new(metric: DistanceMetric) -> Self {
        Self::with_config(StoreConfig {
            default_metric: metric,
            ..StoreConfig::default()
        })
    }

    pub fn with_config(config: StoreConfig) -> Self {
        VectorStore {
            records: IndexMap::new(),
            metric: config.default_metric,
            config,
            embedder: None,
        }
    }

    /// Attach the provider used by text-based operations.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn set_embedder(&mut self, embedder: Arc<dyn EmbeddingProvider>) {
        self.embedder = Some(embedder);
    }

    pub fn embedder(&self) -> Option<&Arc<dyn EmbeddingProvider>> {
        self.embedder.as_ref()
    }

    pub(crate) fn require_embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.embedder
            .clone()
            .ok_or(VectorDbError::MissingEmbeddingProvider)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The metric used when a search doesn't name one
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Change the default metric. Existing records keep their stamped
    /// `distance_metric` field.
    pub fn set_metric(&mut self, metric: DistanceMetric) {
        debug!(from = %self.metric, to = %metric, "changing active metric");
        self.metric = metric;
    }

    /// Change the default metric by registry name.
    pub fn set_metric_by_name(&mut self, name: &str) -> Result<()> {
        self.set_metric(DistanceMetric::from_name(name)?);
        Ok(())
    }

    /// Insert a vector with default metadata
    pub fn insert(&mut self, key: impl Into<String>, vector: Vector) -> Result<()> {
        self.insert_with_metadata(key, vector, Metadata::new())
    }

    /// Insert a vector with metadata, replacing any record under the same key.
    ///
    /// `timestamp`, `vector_dim` and `distance_metric` are stamped first, so
    /// caller-supplied fields of the same name win.
    pub fn insert_with_metadata(
        &mut self,
        key: impl Into<String>,
        vector: Vector,
        metadata: Metadata,
    ) -> Result<()> {
        let key = key.into();
        Self::validate(&key, &vector)?;
        self.put(key, vector, metadata);
        Ok(())
    }

    /// Insert many records, all or nothing: every item is validated before
    /// the first one is written.
    pub fn insert_batch(&mut self, items: Vec<(String, Vector, Metadata)>) -> Result<()> {
        for (key, vector, _) in &items {
            Self::validate(key, vector)?;
        }
        for (key, vector, metadata) in items {
            self.put(key, vector, metadata);
        }
        Ok(())
    }

    pub(crate) fn validate(key: &str, vector: &Vector) -> Result<()> {
        if key.is_empty() {
            return Err(VectorDbError::InvalidKey);
        }
        Ok(())
    }

    fn put(&mut self, key: String, vector: Vector, metadata: Metadata) {
        let mut stamped = Metadata::new()
            .with(TIMESTAMP_FIELD, now_iso8601())
            .with(VECTOR_DIM_FIELD, vector.dimension())
            .with(DISTANCE_METRIC_FIELD, self.metric.name());

        for field in RESERVED_FIELDS {
            if metadata.contains_key(field) {
                warn!(key = %key, field, "caller metadata overrides reserved field");
            }
        }
        stamped.merge(metadata);

        let replaced = self
            .records
            .insert(
                key.clone(),
                VectorRecord {
                    vector,
                    metadata: stamped,
                },
            )
            .is_some();
        debug!(key = %key, replaced, "inserted record");
    }

    /// Merge `update` into a record's metadata and stamp `last_updated`.
    ///
    /// Returns [`VectorDbError::NotFound`] if the key is absent.
    pub fn update_metadata(&mut self, key: &str, update: Metadata) -> Result<()> {
        let record = self
            .records
            .get_mut(key)
            .ok_or_else(|| VectorDbError::NotFound {
                key: key.to_string(),
            })?;

        record.metadata.merge(update);
        record.metadata.insert(LAST_UPDATED_FIELD, now_iso8601());
        debug!(key, "updated metadata");
        Ok(())
    }

    /// Remove a record by key, returning it
    pub fn delete(&mut self, key: &str) -> Result<VectorRecord> {
        let record = self
            .records
            .shift_remove(key)
            .ok_or_else(|| VectorDbError::NotFound {
                key: key.to_string(),
            })?;
        debug!(key, "deleted record");
        Ok(record)
    }

    /// Remove every record. The active metric is kept.
    pub fn clear(&mut self) {
        info!(count = self.records.len(), "clearing store");
        self.records.clear();
    }

    pub fn get(&self, key: &str) -> Option<&VectorRecord> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Keys in store iteration order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.records.keys()
    }

    /// Records in store iteration order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VectorRecord)> {
        self.records.iter()
    }

    /// Get the number of records in the store
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get_statistics(&self) -> Statistics {
        let mut metadata_fields = BTreeSet::new();
        let mut unique_sources: Vec<MetadataValue> = Vec::new();

        for record in self.records.values() {
            metadata_fields.extend(record.metadata.keys().cloned());
            if let Some(source) = record.metadata.get(SOURCE_FIELD) {
                if !unique_sources.contains(source) {
                    unique_sources.push(source.clone());
                }
            }
        }

        Statistics {
            total_vectors: self.records.len(),
            distance_metric: self.metric,
            available_metrics: DistanceMetric::available_names()
                .into_iter()
                .map(String::from)
                .collect(),
            metadata_fields,
            unique_sources,
            vector_dimensions: self
                .records
                .values()
                .next()
                .map_or(0, |r| r.vector.dimension()),
        }
    }

    /// Embed `texts` with the attached provider and insert them, keyed by text.
    ///
    /// Each record's metadata is the matching entry of `metadata_list` (empty
    /// if missing) plus its positional `index`. All embeddings are computed
    /// before anything is inserted, so a provider failure leaves the store
    /// unchanged.
    pub async fn build_from(
        &mut self,
        texts: &[String],
        metadata_list: Option<&[Metadata]>,
    ) -> Result<()> {
        let embedder = self.require_embedder()?;
        let items = embed_batch(&*embedder, texts, metadata_list).await?;
        self.insert_batch(items)?;
        info!(count = texts.len(), total = self.len(), "built records from texts");
        Ok(())
    }

    /// Create a store from texts in one step; see [`VectorStore::build_from`].
    pub async fn from_texts(
        embedder: Arc<dyn EmbeddingProvider>,
        metric: DistanceMetric,
        texts: &[String],
        metadata_list: Option<&[Metadata]>,
    ) -> Result<Self> {
        let mut store = VectorStore::new(metric).with_embedder(embedder);
        store.build_from(texts, metadata_list).await?;
        Ok(store)
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStore")
            .field("records", &self.records.len())
            .field("metric", &self.metric)
            .field("config", &self.config)
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}

/// Embed `texts` and pair each with its metadata entry plus positional `index`.
pub(crate) async fn embed_batch(
    embedder: &dyn EmbeddingProvider,
    texts: &[String],
    metadata_list: Option<&[Metadata]>,
) -> Result<Vec<(String, Vector, Metadata)>> {
    let embeddings = embedder.embed_many(texts).await?;
    if embeddings.len() != texts.len() {
        return Err(VectorDbError::EmbeddingCountMismatch {
            expected: texts.len(),
            actual: embeddings.len(),
        });
    }

    Ok(texts
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(i, (text, vector))| {
            let mut metadata = metadata_list
                .and_then(|list| list.get(i))
                .cloned()
                .unwrap_or_default();
            metadata.insert(INDEX_FIELD, i);
            (text.clone(), vector, metadata)
        })
        .collect())
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
