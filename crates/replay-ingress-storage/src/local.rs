use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::keys::validate_object_name;
use crate::traits::{
    ObjectAttributes, ObjectStorage, ObjectWriter, StorageError, StorageResult, StoredObject,
};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const PART_SUFFIX: &str = ".part";
const METADATA_SUFFIX: &str = ".meta.json";

/// Attributes persisted next to each object as `<name>.meta.json`.
#[derive(Debug, Serialize, Deserialize)]
struct SidecarMetadata {
    content_type: Option<String>,
    metadata: BTreeMap<String, String>,
}

/// Local filesystem storage implementation
///
/// Each object is written to `<name>.part` and renamed into place on finalize,
/// after its sidecar metadata file has been written.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/replay-ingress")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    fn key_to_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_object_name(name)?;
        if name.ends_with(PART_SUFFIX) || name.ends_with(METADATA_SUFFIX) {
            return Err(StorageError::InvalidKey(
                "Object name uses a reserved suffix".to_string(),
            ));
        }
        Ok(self.base_path.join(name))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn create_writer(
        &self,
        name: &str,
        attributes: ObjectAttributes,
    ) -> StorageResult<Box<dyn ObjectWriter>> {
        let path = self.key_to_path(name)?;
        self.ensure_parent_dir(&path).await?;

        let part_path = with_suffix(&path, PART_SUFFIX);
        let file = fs::File::create(&part_path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create file {}: {}",
                part_path.display(),
                e
            ))
        })?;

        Ok(Box::new(LocalObjectWriter {
            file: Some(file),
            part_path,
            metadata_path: with_suffix(&path, METADATA_SUFFIX),
            path,
            attributes,
            size_bytes: 0,
            start: Instant::now(),
            done: false,
        }))
    }

    async fn read(&self, name: &str) -> StorageResult<StoredObject> {
        let path = self.key_to_path(name)?;

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let metadata_path = with_suffix(&path, METADATA_SUFFIX);
        let attributes = match fs::read(&metadata_path).await {
            Ok(raw) => {
                let sidecar: SidecarMetadata = serde_json::from_slice(&raw).map_err(|e| {
                    StorageError::ReadFailed(format!(
                        "Corrupt metadata file {}: {}",
                        metadata_path.display(),
                        e
                    ))
                })?;
                ObjectAttributes {
                    content_type: sidecar.content_type,
                    metadata: sidecar.metadata,
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ObjectAttributes::default(),
            Err(e) => return Err(StorageError::ReadFailed(e.to_string())),
        };

        Ok(StoredObject {
            name: name.to_string(),
            attributes,
            data: Bytes::from(data),
        })
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.key_to_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

struct LocalObjectWriter {
    file: Option<fs::File>,
    part_path: PathBuf,
    metadata_path: PathBuf,
    path: PathBuf,
    attributes: ObjectAttributes,
    size_bytes: u64,
    start: Instant,
    done: bool,
}

impl LocalObjectWriter {
    async fn commit(&mut self) -> StorageResult<()> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| StorageError::FinalizeFailed("Writer already closed".to_string()))?;

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let sidecar = SidecarMetadata {
            content_type: self.attributes.content_type.clone(),
            metadata: self.attributes.metadata.clone(),
        };
        let raw = serde_json::to_vec(&sidecar)
            .map_err(|e| StorageError::FinalizeFailed(e.to_string()))?;
        fs::write(&self.metadata_path, raw).await?;

        if let Err(e) = fs::rename(&self.part_path, &self.path).await {
            let _ = fs::remove_file(&self.metadata_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectWriter for LocalObjectWriter {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StorageError::WriteFailed("Writer already closed".to_string()))?;

        file.write_all(chunk).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                self.part_path.display(),
                e
            ))
        })?;
        self.size_bytes += chunk.len() as u64;
        Ok(())
    }

    async fn finalize(self: Box<Self>) -> StorageResult<()> {
        let mut this = *self;

        if let Err(e) = this.commit().await {
            tracing::error!(
                error = %e,
                path = %this.path.display(),
                "Local storage finalize failed"
            );
            return Err(StorageError::FinalizeFailed(e.to_string()));
        }
        this.done = true;

        tracing::info!(
            path = %this.path.display(),
            size_bytes = this.size_bytes,
            duration_ms = this.start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        let mut this = *self;
        this.file.take();
        this.done = true;

        match fs::remove_file(&this.part_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }
}

impl Drop for LocalObjectWriter {
    fn drop(&mut self) {
        if !self.done {
            // Dropped mid-upload (e.g. client disconnect); no async context here.
            let _ = std::fs::remove_file(&self.part_path);
        }
    }
}
