//! # ragvec_db
//!
//! An in-memory vector store for the retrieval stage of a RAG pipeline.
//!
//! This library provides:
//! - Record storage keyed by text, with open-schema metadata
//! - Eight similarity metrics (cosine, euclidean, manhattan, dot product,
//!   minkowski, chebyshev, correlation, jaccard), all "higher = more similar"
//! - Brute-force top-k search with metadata filters
//! - Text search and batch building through an injected embedding provider
//! - JSON persistence and checksummed snapshots
//!
//! ## Example
//!
//! ```rust
//! use ragvec_db::{DistanceMetric, Filter, Metadata, Vector, VectorStore};
//!
//! // Create a vector store
//! let mut store = VectorStore::new(DistanceMetric::Cosine);
//!
//! // Insert vectors
//! store
//!     .insert_with_metadata(
//!         "Retrieval augments generation.",
//!         Vector::new(vec![1.0, 0.0]),
//!         Metadata::new().with("source", "paper.pdf").with("page", 3),
//!     )
//!     .unwrap();
//!
//! // Search for similar vectors from one source
//! let filter = Filter::new().eq("source", "paper.pdf");
//! let results = store
//!     .search(&Vector::new(vec![0.9, 0.1]), 5, None, Some(&filter))
//!     .unwrap();
//! assert_eq!(results.len(), 1);
//! ```

pub mod config;
pub mod distance;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod persistence;
pub mod search;
pub mod shared;
pub mod storage;
pub mod vector;

pub use config::StoreConfig;
pub use distance::DistanceMetric;
pub use embedding::EmbeddingProvider;
pub use error::{Result, VectorDbError};
pub use filter::{Comparison, Condition, Filter};
pub use metadata::{Metadata, MetadataValue};
pub use persistence::{SnapshotManager, StoreDocument};
pub use search::SearchResult;
pub use shared::SharedStore;
pub use storage::{Statistics, VectorRecord, VectorStore};
pub use vector::Vector;
