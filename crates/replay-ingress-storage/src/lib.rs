//! Replay Ingress Storage Library
//!
//! This crate provides the object storage abstraction used to persist uploaded
//! replays, with backends for cloud object stores (GCS, S3, in-memory via
//! `object_store`) and the local filesystem.
//!
//! # Write model
//!
//! Objects are written through an [`ObjectWriter`]: bytes are streamed with
//! `write`, and the object only becomes visible once `finalize` succeeds. A
//! writer that is aborted, or dropped without being finalized, never produces
//! a readable object.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-cloud")]
pub mod cloud;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-cloud")]
pub use cloud::CloudStorage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use replay_ingress_core::StorageBackend;
pub use traits::{
    ObjectAttributes, ObjectStorage, ObjectWriter, StorageError, StorageResult, StoredObject,
};
