//! Snapshot: save/load the full store to/from a directory.
//!
//! The directory holds `store.json` (the codec document) and `manifest.json`
//! with a crc32 of the document, checked on load.

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, VectorDbError};
use crate::persistence::codec;
use crate::storage::VectorStore;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Human-readable summary written next to each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub record_count: usize,
    pub active_metric: String,
    pub crc32: u32,
    pub saved_at: String,
}

/// Manages saving and loading store snapshots.
pub struct SnapshotManager {
    dir: PathBuf,
}

impl SnapshotManager {
    /// Create a snapshot manager for the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join("store.json")
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join("manifest.json")
    }

    /// Save a snapshot of the store to disk.
    pub fn save(&self, store: &VectorStore) -> Result<Manifest> {
        let data = codec::to_json(store)?;
        fs::write(self.snapshot_path(), &data)?;

        let manifest = Manifest {
            record_count: store.len(),
            active_metric: store.metric().name().to_string(),
            crc32: crc32fast::hash(&data),
            saved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| VectorDbError::SerializationError(e.to_string()))?;
        fs::write(self.manifest_path(), &manifest_bytes)?;

        info!(dir = %self.dir.display(), records = manifest.record_count, "saved snapshot");
        Ok(manifest)
    }

    /// Load the snapshot, or return None if none exists.
    pub fn load(
        &self,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Option<VectorStore>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        match self.manifest()? {
            Some(manifest) => {
                let actual = crc32fast::hash(&data);
                if actual != manifest.crc32 {
                    return Err(VectorDbError::ChecksumMismatch {
                        expected: manifest.crc32,
                        actual,
                    });
                }
            }
            None => warn!(dir = %self.dir.display(), "snapshot has no manifest, skipping checksum"),
        }

        let store = codec::from_json(&data, embedder)?;
        info!(dir = %self.dir.display(), records = store.len(), "loaded snapshot");
        Ok(Some(store))
    }

    /// Read the manifest, if present.
    pub fn manifest(&self) -> Result<Option<Manifest>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        let manifest = serde_json::from_slice(&bytes)
            .map_err(|e| VectorDbError::SerializationError(e.to_string()))?;
        Ok(Some(manifest))
    }

    /// Check if a snapshot exists.
    pub fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }
}
