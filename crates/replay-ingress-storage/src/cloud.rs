use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use crate::keys::validate_object_name;
use crate::traits::{
    ObjectAttributes, ObjectStorage, ObjectWriter, StorageError, StorageResult, StoredObject,
};
use crate::StorageBackend;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, AttributeValue, Attributes, GetOptions, ObjectStore};
use tokio::io::AsyncWriteExt;

/// Cloud object storage backed by `object_store` (GCS, S3, or in-memory)
#[derive(Clone)]
pub struct CloudStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    backend: StorageBackend,
}

impl CloudStorage {
    /// Google Cloud Storage bucket; credentials come from the environment
    /// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, or instance metadata).
    pub fn gcs(bucket: String) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::from_store(Arc::new(store), bucket, StorageBackend::Gcs))
    }

    /// S3 bucket
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn s3(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::from_store(Arc::new(store), bucket, StorageBackend::S3))
    }

    /// Process-local store; contents are lost on exit.
    pub fn in_memory() -> Self {
        Self::from_store(
            Arc::new(InMemory::new()),
            "memory".to_string(),
            StorageBackend::Memory,
        )
    }

    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: String, backend: StorageBackend) -> Self {
        Self {
            store,
            bucket,
            backend,
        }
    }
}

fn to_object_store_attributes(attributes: &ObjectAttributes) -> Attributes {
    let mut out = Attributes::new();
    if let Some(ref content_type) = attributes.content_type {
        out.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.clone()),
        );
    }
    for (key, value) in &attributes.metadata {
        out.insert(
            Attribute::Metadata(Cow::Owned(key.clone())),
            AttributeValue::from(value.clone()),
        );
    }
    out
}

fn from_object_store_attributes(attributes: &Attributes) -> ObjectAttributes {
    let mut out = ObjectAttributes::default();
    for (attribute, value) in attributes.iter() {
        let value: &str = value.as_ref();
        match attribute {
            Attribute::ContentType => out.content_type = Some(value.to_string()),
            Attribute::Metadata(key) => {
                out.metadata.insert(key.to_string(), value.to_string());
            }
            _ => {}
        }
    }
    out
}

#[async_trait]
impl ObjectStorage for CloudStorage {
    async fn create_writer(
        &self,
        name: &str,
        attributes: ObjectAttributes,
    ) -> StorageResult<Box<dyn ObjectWriter>> {
        validate_object_name(name)?;
        let location = Path::from(name);
        let writer = BufWriter::new(self.store.clone(), location)
            .with_attributes(to_object_store_attributes(&attributes));

        tracing::debug!(
            bucket = %self.bucket,
            key = %name,
            backend = %self.backend,
            "Opened object writer"
        );

        Ok(Box::new(CloudObjectWriter {
            writer,
            bucket: self.bucket.clone(),
            key: name.to_string(),
            size_bytes: 0,
            start: Instant::now(),
        }))
    }

    async fn read(&self, name: &str) -> StorageResult<StoredObject> {
        validate_object_name(name)?;
        let start = Instant::now();
        let location = Path::from(name);

        let result = self
            .store
            .get_opts(&location, GetOptions::default())
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound { .. } => StorageError::NotFound(name.to_string()),
                other => {
                    tracing::error!(
                        error = %other,
                        bucket = %self.bucket,
                        key = %name,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Object read failed"
                    );
                    StorageError::ReadFailed(other.to_string())
                }
            })?;

        let attributes = from_object_store_attributes(&result.attributes);
        let data = result
            .bytes()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %name,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object read successful"
        );

        Ok(StoredObject {
            name: name.to_string(),
            attributes,
            data,
        })
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_object_name(name)?;
        let location = Path::from(name);
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        match self.store.get_opts(&location, options).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}

/// Buffers writes and uploads them on `finalize`; large bodies go out as a multipart upload.
struct CloudObjectWriter {
    writer: BufWriter,
    bucket: String,
    key: String,
    size_bytes: u64,
    start: Instant,
}

#[async_trait]
impl ObjectWriter for CloudObjectWriter {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        self.writer.write_all(chunk).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %self.key,
                size_bytes = self.size_bytes,
                "Object write failed"
            );
            StorageError::WriteFailed(e.to_string())
        })?;
        self.size_bytes += chunk.len() as u64;
        Ok(())
    }

    async fn finalize(self: Box<Self>) -> StorageResult<()> {
        let mut this = *self;
        this.writer.shutdown().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %this.bucket,
                key = %this.key,
                size_bytes = this.size_bytes,
                duration_ms = this.start.elapsed().as_secs_f64() * 1000.0,
                "Object finalize failed"
            );
            StorageError::FinalizeFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %this.bucket,
            key = %this.key,
            size_bytes = this.size_bytes,
            duration_ms = this.start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(())
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        let mut this = *self;
        this.writer
            .abort()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        tracing::info!(
            bucket = %this.bucket,
            key = %this.key,
            "Object upload aborted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn replay_attributes() -> ObjectAttributes {
        ObjectAttributes::new("blizzard/storm-replay").with_metadata(BTreeMap::from([
            ("SourceAddress".to_string(), "127.0.0.1:4000".to_string()),
            ("UploadTimestamp".to_string(), "1".to_string()),
            ("FileHash".to_string(), "abc".to_string()),
        ]))
    }

    #[tokio::test]
    async fn test_finalized_object_is_readable_with_attributes() {
        let storage = CloudStorage::in_memory();

        let mut writer = storage
            .create_writer("replay.StormReplay", replay_attributes())
            .await
            .unwrap();
        writer.write(b"first ").await.unwrap();
        writer.write(b"second").await.unwrap();
        writer.finalize().await.unwrap();

        let object = storage.read("replay.StormReplay").await.unwrap();
        assert_eq!(object.data.as_ref(), b"first second");
        assert_eq!(object.attributes, replay_attributes());
    }

    #[tokio::test]
    async fn test_unfinalized_object_is_not_visible() {
        let storage = CloudStorage::in_memory();

        let mut writer = storage
            .create_writer("pending.StormReplay", replay_attributes())
            .await
            .unwrap();
        writer.write(b"partial").await.unwrap();
        assert!(!storage.exists("pending.StormReplay").await.unwrap());

        writer.abort().await.unwrap();
        assert!(!storage.exists("pending.StormReplay").await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_writer_leaves_nothing() {
        let storage = CloudStorage::in_memory();
        {
            let mut writer = storage
                .create_writer("dropped.StormReplay", replay_attributes())
                .await
                .unwrap();
            writer.write(b"bytes").await.unwrap();
        }
        assert!(!storage.exists("dropped.StormReplay").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_object() {
        let storage = CloudStorage::in_memory();
        let result = storage.read("missing.StormReplay").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_name_rejected() {
        let storage = CloudStorage::in_memory();
        let result = storage
            .create_writer("../escape", ObjectAttributes::default())
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_backend_type() {
        assert_eq!(
            CloudStorage::in_memory().backend_type(),
            StorageBackend::Memory
        );
    }
}
