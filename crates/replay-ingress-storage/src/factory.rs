#[cfg(feature = "storage-cloud")]
use crate::CloudStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{ObjectStorage, StorageBackend, StorageError, StorageResult};
use replay_ingress_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn ObjectStorage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-cloud")]
        StorageBackend::Gcs => {
            let storage = CloudStorage::gcs(config.gcs_bucket().to_string())?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-cloud")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .map(String::from)
                .or_else(|| config.aws_region().map(String::from))
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let storage = CloudStorage::s3(bucket, region, endpoint)?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-cloud")]
        StorageBackend::Memory => Ok(Arc::new(CloudStorage::in_memory())),

        #[cfg(not(feature = "storage-cloud"))]
        StorageBackend::Gcs | StorageBackend::S3 | StorageBackend::Memory => {
            Err(StorageError::ConfigError(
                "Cloud storage backends not available (storage-cloud feature not enabled)"
                    .to_string(),
            ))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
