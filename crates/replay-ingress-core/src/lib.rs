//! Replay Ingress Core Library
//!
//! This crate provides the configuration, error taxonomy, and replay identity
//! (content hashing and object naming) shared by the storage and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod replay;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorMetadata, LogLevel, UploadError};
pub use replay::{calculate_file_hash, ReplayIdentity};
pub use storage_types::StorageBackend;
