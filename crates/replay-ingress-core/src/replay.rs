//! Replay identity: content hash, upload timestamp, and the object name derived from them.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::constants::{
    METADATA_FILE_HASH, METADATA_SOURCE_ADDRESS, METADATA_UPLOAD_TIMESTAMP, OBJECT_NAME_PREFIX,
    REPLAY_FILE_EXTENSION,
};

/// SHA-256 of `buf` rendered as 64 lowercase hex characters.
pub fn calculate_file_hash(buf: &[u8]) -> String {
    hex::encode(Sha256::digest(buf))
}

/// Identity of one uploaded replay.
///
/// Both fields are kept in their rendered string form since they appear verbatim
/// in the object name and in the stored metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayIdentity {
    file_hash: String,
    upload_timestamp: String,
}

impl ReplayIdentity {
    /// Build the identity of `payload` uploaded at `upload_time_nanos` (nanoseconds since the Unix epoch).
    pub fn new(payload: &[u8], upload_time_nanos: u128) -> Self {
        Self {
            file_hash: calculate_file_hash(payload),
            upload_timestamp: upload_time_nanos.to_string(),
        }
    }

    /// Build the identity of `payload` stamped with the current wall-clock time.
    pub fn capture(payload: &[u8]) -> Self {
        // A clock set before 1970 stamps zero rather than failing the upload.
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::new(payload, nanos)
    }

    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    pub fn upload_timestamp(&self) -> &str {
        &self.upload_timestamp
    }

    /// `replay-upload-<timestamp>-<hash>.StormReplay`
    pub fn object_name(&self) -> String {
        format!(
            "{}-{}-{}.{}",
            OBJECT_NAME_PREFIX, self.upload_timestamp, self.file_hash, REPLAY_FILE_EXTENSION
        )
    }

    /// Metadata attached to the stored object.
    pub fn metadata(&self, source_address: &str) -> BTreeMap<String, String> {
        BTreeMap::from([
            (METADATA_SOURCE_ADDRESS.to_string(), source_address.to_string()),
            (
                METADATA_UPLOAD_TIMESTAMP.to_string(),
                self.upload_timestamp.clone(),
            ),
            (METADATA_FILE_HASH.to_string(), self.file_hash.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_hash_of_empty_payload() {
        assert_eq!(calculate_file_hash(b""), EMPTY_SHA256);
    }

    #[test]
    fn test_hash_is_lowercase_hex_and_fixed_length() {
        let hash = calculate_file_hash(b"some replay bytes");
        assert_eq!(hash.len(), 64);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(hash, calculate_file_hash(b"some replay bytes"));
    }

    #[test]
    fn test_single_bit_flip_changes_hash() {
        let original = vec![0u8; 1024];
        let mut flipped = original.clone();
        flipped[511] ^= 0x01;
        assert_ne!(calculate_file_hash(&original), calculate_file_hash(&flipped));
    }

    #[test]
    fn test_object_name_layout() {
        let identity = ReplayIdentity::new(b"", 1_500_000_000_123_456_789);
        assert_eq!(
            identity.object_name(),
            format!("replay-upload-1500000000123456789-{}.StormReplay", EMPTY_SHA256)
        );
    }

    #[test]
    fn test_same_content_different_instants_yield_distinct_names() {
        let payload = b"identical";
        let first = ReplayIdentity::new(payload, 1_000);
        let second = ReplayIdentity::new(payload, 1_001);
        assert_eq!(first.file_hash(), second.file_hash());
        assert_ne!(first.object_name(), second.object_name());
    }

    #[test]
    fn test_metadata_has_exactly_three_keys() {
        let identity = ReplayIdentity::new(b"abc", 42);
        let metadata = identity.metadata("10.0.0.1:5555");
        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata["SourceAddress"], "10.0.0.1:5555");
        assert_eq!(metadata["UploadTimestamp"], "42");
        assert_eq!(metadata["FileHash"], calculate_file_hash(b"abc"));
    }

    #[test]
    fn test_capture_stamps_a_nonzero_time() {
        let identity = ReplayIdentity::capture(b"now");
        let nanos: u128 = identity.upload_timestamp().parse().unwrap();
        assert!(nanos > 0);
    }
}
