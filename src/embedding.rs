//! Embedding provider interface.
//!
//! The store never computes embeddings itself. Text-based operations
//! ([`VectorStore::build_from`](crate::storage::VectorStore::build_from) and
//! [`VectorStore::search_by_text`](crate::storage::VectorStore::search_by_text))
//! delegate to an injected [`EmbeddingProvider`], and provider failures are
//! returned to the caller unchanged.
//!
//! ```
//! use async_trait::async_trait;
//! use ragvec_db::embedding::EmbeddingProvider;
//! use ragvec_db::{Result, Vector};
//!
//! struct LengthEmbedder;
//!
//! #[async_trait]
//! impl EmbeddingProvider for LengthEmbedder {
//!     async fn embed_one(&self, text: &str) -> Result<Vector> {
//!         Ok(Vector::new(vec![text.len() as f64, 1.0]))
//!     }
//! }
//! ```

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::Result;
use crate::vector::Vector;

/// Turns text into embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Vector>;

    /// Embed a batch of texts. The output must be aligned with the input.
    ///
    /// The default implementation issues one `embed_one` call per text
    /// concurrently; providers with a native batch endpoint should override it.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        try_join_all(texts.iter().map(|text| self.embed_one(text))).await
    }
}
