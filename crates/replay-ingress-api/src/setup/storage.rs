//! Storage client setup

use replay_ingress_core::Config;

use crate::state::StorageHandle;

/// Build the process-wide storage handle, warming it now when configured to.
///
/// A failed warm-up is logged and left for the first request to retry; the
/// server still starts.
pub async fn initialize_storage(config: &Config) -> StorageHandle {
    let handle = StorageHandle::from_config(config.clone());

    if config.storage_eager_init() {
        match handle.get().await {
            Ok(storage) => {
                tracing::info!(backend = %storage.backend_type(), "Storage client initialized");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    backend = %config.storage_backend(),
                    "Storage client initialization failed; uploads will retry it"
                );
            }
        }
    }

    handle
}
