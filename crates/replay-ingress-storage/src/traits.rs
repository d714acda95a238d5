//! Storage abstraction traits
//!
//! This module defines the `ObjectStorage` and `ObjectWriter` traits that all
//! storage backends must implement.

use std::collections::BTreeMap;

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Finalize failed: {0}")]
    FinalizeFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object name: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Content type and user metadata attached to an object when it is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub content_type: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl ObjectAttributes {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A committed object read back from a backend.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub name: String,
    pub attributes: ObjectAttributes,
    pub data: Bytes,
}

/// Write stream for a single object.
///
/// Nothing written is visible to readers until `finalize` returns `Ok`. Callers
/// that hit a write error should `abort` instead of finalizing.
#[async_trait]
pub trait ObjectWriter: Send {
    /// Append `chunk` to the object body.
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()>;

    /// Commit the object. A failure here means the object may not exist.
    async fn finalize(self: Box<Self>) -> StorageResult<()>;

    /// Discard everything written so far.
    async fn abort(self: Box<Self>) -> StorageResult<()>;
}

/// Object storage abstraction trait
///
/// Implementations are shared across concurrent requests, so they must be
/// usable through `&self` from many tasks at once.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Open a write stream for `name` carrying `attributes`.
    async fn create_writer(
        &self,
        name: &str,
        attributes: ObjectAttributes,
    ) -> StorageResult<Box<dyn ObjectWriter>>;

    /// Read a committed object with its attributes.
    async fn read(&self, name: &str) -> StorageResult<StoredObject>;

    /// Check if a committed object exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
