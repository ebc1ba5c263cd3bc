//! Document codec: the full store state as a JSON document.
//!
//! ```json
//! {
//!   "records": { "<key>": { "vector": [0.1, 0.2], "metadata": { ... } } },
//!   "active_metric": "cosine"
//! }
//! ```
//!
//! Records are written in store iteration order and read back in document
//! order, so ranking ties resolve identically after a round trip. The older
//! layout `{"vectors": {...}, "metadata": {...}, "distance_metric": "..."}`
//! is accepted on load.

use crate::distance::DistanceMetric;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, VectorDbError};
use crate::metadata::Metadata;
use crate::storage::{VectorRecord, VectorStore};
use crate::vector::Vector;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Serializable form of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedRecord {
    pub vector: Vec<f64>,
    pub metadata: Metadata,
}

/// Serializable form of the full store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub records: IndexMap<String, SerializedRecord>,
    pub active_metric: String,
}

/// Layout written by earlier versions: vectors and metadata in parallel maps.
#[derive(Debug, Deserialize)]
struct LegacyDocument {
    vectors: IndexMap<String, Vec<f64>>,
    #[serde(default)]
    metadata: IndexMap<String, Metadata>,
    #[serde(default = "default_metric_name")]
    distance_metric: String,
}

fn default_metric_name() -> String {
    DistanceMetric::Cosine.name().to_string()
}

impl From<LegacyDocument> for StoreDocument {
    fn from(legacy: LegacyDocument) -> Self {
        let LegacyDocument {
            vectors,
            mut metadata,
            distance_metric,
        } = legacy;

        let records = vectors
            .into_iter()
            .map(|(key, vector)| {
                let metadata = metadata.shift_remove(&key).unwrap_or_default();
                (key, SerializedRecord { vector, metadata })
            })
            .collect();

        StoreDocument {
            records,
            active_metric: distance_metric,
        }
    }
}

/// Capture the store's records and active metric.
pub fn save(store: &VectorStore) -> StoreDocument {
    StoreDocument {
        records: store
            .iter()
            .map(|(key, record)| {
                (
                    key.clone(),
                    SerializedRecord {
                        vector: record.vector().as_slice().to_vec(),
                        metadata: record.metadata().clone(),
                    },
                )
            })
            .collect(),
        active_metric: store.metric().name().to_string(),
    }
}

/// Rebuild a store from a document. Metadata is restored verbatim, without
/// re-stamping.
pub fn load(
    document: StoreDocument,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
) -> Result<VectorStore> {
    let metric = DistanceMetric::from_name(&document.active_metric)?;
    let mut store = VectorStore::new(metric);
    store.embedder = embedder;

    for (key, record) in document.records {
        let vector = Vector::new(record.vector);
        VectorStore::validate(&key, &vector)?;
        store.records.insert(
            key,
            VectorRecord {
                vector,
                metadata: record.metadata,
            },
        );
    }
    Ok(store)
}

/// Encode the store as JSON bytes.
pub fn to_json(store: &VectorStore) -> Result<Vec<u8>> {
    serde_json::to_vec(&save(store)).map_err(|e| VectorDbError::SerializationError(e.to_string()))
}

/// Either on-disk layout. Parsed straight from the bytes so record order
/// follows the document.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnyDocument {
    Current(StoreDocument),
    Legacy(LegacyDocument),
}

/// Decode a store from JSON bytes in either the current or the legacy layout.
pub fn from_json(
    bytes: &[u8],
    embedder: Option<Arc<dyn EmbeddingProvider>>,
) -> Result<VectorStore> {
    let document = match serde_json::from_slice::<AnyDocument>(bytes) {
        Ok(AnyDocument::Current(document)) => document,
        Ok(AnyDocument::Legacy(legacy)) => StoreDocument::from(legacy),
        Err(e) if e.is_data() => {
            return Err(VectorDbError::SerializationError(
                "document matches neither the `records` nor the `vectors` layout".to_string(),
            ))
        }
        Err(e) => return Err(VectorDbError::SerializationError(e.to_string())),
    };

    load(document, embedder)
}

/// Write the store to a JSON file.
pub fn save_to_json(store: &VectorStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_json(store)?)?;
    info!(path = %path.display(), records = store.len(), "saved store");
    Ok(())
}

/// Read a store from a JSON file.
pub fn load_from_json(
    path: impl AsRef<Path>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
) -> Result<VectorStore> {
    let path = path.as_ref();
    let store = from_json(&fs::read(path)?, embedder)?;
    info!(path = %path.display(), records = store.len(), metric = %store.metric(), "loaded store");
    Ok(store)
}

impl VectorStore {
    /// See [`save`].
    pub fn to_document(&self) -> StoreDocument {
        save(self)
    }

    /// See [`load`].
    pub fn from_document(
        document: StoreDocument,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self> {
        load(document, embedder)
    }

    /// See [`save_to_json`].
    pub fn save_to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        save_to_json(self, path)
    }

    /// See [`load_from_json`].
    pub fn load_from_json(
        path: impl AsRef<Path>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self> {
        load_from_json(path, embedder)
    }
}
