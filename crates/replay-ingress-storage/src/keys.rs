//! Shared object name validation for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject names that are empty, absolute, or that could climb out of the bucket root.
pub fn validate_object_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidKey("Object name is empty".to_string()));
    }
    if name.contains("..") || name.starts_with('/') || name.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Object name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
