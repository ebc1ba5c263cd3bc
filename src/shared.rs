//! Thread-safe handle for hosts that share one store across threads.
//!
//! Reads (search, statistics) take a shared lock and run concurrently; writes
//! take the exclusive lock. Embedding calls happen before any lock is taken,
//! so a slow provider never blocks other readers or writers.

use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::filter::Filter;
use crate::metadata::Metadata;
use crate::search::SearchResult;
use crate::storage::{embed_batch, Statistics, VectorStore};
use crate::vector::Vector;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// A cloneable, lock-protected [`VectorStore`].
#[derive(Clone, Debug)]
pub struct SharedStore {
    inner: Arc<RwLock<VectorStore>>,
}

impl SharedStore {
    pub fn new(store: VectorStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Acquire the shared lock.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, VectorStore>> {
        self.inner.read().map_err(|_| VectorDbError::LockPoisoned)
    }

    /// Acquire the exclusive lock.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, VectorStore>> {
        self.inner.write().map_err(|_| VectorDbError::LockPoisoned)
    }

    pub fn insert_with_metadata(
        &self,
        key: impl Into<String>,
        vector: Vector,
        metadata: Metadata,
    ) -> Result<()> {
        self.write()?.insert_with_metadata(key, vector, metadata)
    }

    pub fn update_metadata(&self, key: &str, update: Metadata) -> Result<()> {
        self.write()?.update_metadata(key, update)
    }

    pub fn search(
        &self,
        query: &Vector,
        k: usize,
        metric: Option<DistanceMetric>,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        self.read()?.search(query, k, metric, filter)
    }

    pub fn get_statistics(&self) -> Result<Statistics> {
        Ok(self.read()?.get_statistics())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Embed the query without holding the lock, then search under the shared lock.
    pub async fn search_by_text(
        &self,
        query_text: &str,
        k: usize,
        metric: Option<DistanceMetric>,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        let embedder = self.read()?.require_embedder()?;
        let query = embedder.embed_one(query_text).await?;
        self.search(&query, k, metric, filter)
    }

    /// Embed every text without holding the lock, then insert them all under
    /// one exclusive lock.
    pub async fn build_from(
        &self,
        texts: &[String],
        metadata_list: Option<&[Metadata]>,
    ) -> Result<()> {
        let embedder = self.read()?.require_embedder()?;
        let items = embed_batch(&*embedder, texts, metadata_list).await?;

        let mut store = self.write()?;
        store.insert_batch(items)?;
        info!(count = texts.len(), total = store.len(), "built records from texts");
        Ok(())
    }
}
