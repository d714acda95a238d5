//! Application state shared by every request.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use replay_ingress_core::{Config, UploadError};
use replay_ingress_storage::{create_storage, ObjectStorage, StorageError, StorageResult};
use tokio::sync::OnceCell;

type StorageInit =
    Box<dyn Fn() -> BoxFuture<'static, StorageResult<Arc<dyn ObjectStorage>>> + Send + Sync>;

/// Process-wide storage client, built at most once.
///
/// The first caller of [`StorageHandle::get`] runs the initializer; concurrent
/// callers wait for it. A failed initialization leaves the handle empty, so the
/// next request tries again.
pub struct StorageHandle {
    cell: OnceCell<Arc<dyn ObjectStorage>>,
    init: Option<StorageInit>,
}

impl StorageHandle {
    /// Handle whose client is built by `init` on first use.
    pub fn lazy<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StorageResult<Arc<dyn ObjectStorage>>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Some(Box::new(move || init().boxed())),
        }
    }

    /// Handle around an already constructed client.
    pub fn ready(storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(storage)),
            init: None,
        }
    }

    /// Handle that builds the backend selected by `config` on first use.
    pub fn from_config(config: Config) -> Self {
        Self::lazy(move || {
            let config = config.clone();
            async move { create_storage(&config).await }
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Return the shared client, initializing it if needed.
    pub async fn get(&self) -> Result<Arc<dyn ObjectStorage>, UploadError> {
        self.cell
            .get_or_try_init(|| async {
                match &self.init {
                    Some(init) => init().await,
                    None => Err(StorageError::ConfigError(
                        "no storage initializer configured".to_string(),
                    )),
                }
            })
            .await
            .cloned()
            .map_err(|e| UploadError::StorageUnavailable(e.to_string()))
    }
}

/// Limits applied to every upload request.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_upload_size_bytes: usize,
    pub trusted_proxy_count: usize,
}

impl UploadConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_upload_size_bytes: config.max_upload_size_bytes(),
            trusted_proxy_count: config.trusted_proxy_count(),
        }
    }
}

pub struct AppState {
    pub storage: StorageHandle,
    pub upload: UploadConfig,
}

impl AppState {
    pub fn new(storage: StorageHandle, upload: UploadConfig) -> Self {
        Self { storage, upload }
    }
}
