//! Replay Ingress API Library
//!
//! This crate provides the HTTP upload handler, error mapping, and application setup.

mod handlers;
mod services;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use state::{AppState, StorageHandle, UploadConfig};
