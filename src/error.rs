//! Error types for the vector store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, VectorDbError>;

/// Error types that can occur in store operations
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Unknown distance metric: {name}. Available metrics: {available}")]
    UnknownMetric { name: String, available: String },

    #[error(
        "Dimension mismatch for {}: expected {expected}, got {actual}",
        .key.as_deref().unwrap_or("vector")
    )]
    DimensionMismatch {
        key: Option<String>,
        expected: usize,
        actual: usize,
    },

    #[error("Record not found: {key}")]
    NotFound { key: String },

    #[error("Record key must not be empty")]
    InvalidKey,

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Embedding provider returned {actual} vectors for {expected} texts")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    #[error("No embedding provider configured")]
    MissingEmbeddingProvider,

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Checksum mismatch: manifest says {expected:08x}, data hashes to {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}
