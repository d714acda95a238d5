//! Wire-level constants for replay ingestion.
//!
//! Object names, the content type, and the metadata keys are read by downstream
//! consumers of the bucket and must stay bit-exact.

/// Multipart form field carrying the replay bytes.
pub const REPLAY_FILE_FIELD: &str = "replayFile";

/// Prefix of every stored object name.
pub const OBJECT_NAME_PREFIX: &str = "replay-upload";

/// Extension of every stored object name (without the leading dot).
pub const REPLAY_FILE_EXTENSION: &str = "StormReplay";

/// Content type attached to stored replays.
pub const REPLAY_CONTENT_TYPE: &str = "blizzard/storm-replay";

/// Metadata key holding the uploader's network address.
pub const METADATA_SOURCE_ADDRESS: &str = "SourceAddress";

/// Metadata key holding the upload timestamp (nanoseconds since the Unix epoch).
pub const METADATA_UPLOAD_TIMESTAMP: &str = "UploadTimestamp";

/// Metadata key holding the lowercase hex SHA-256 of the replay.
pub const METADATA_FILE_HASH: &str = "FileHash";

/// Default ceiling for a parsed multipart form (8 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 8 * 1024 * 1024;

/// Default bucket for the GCS backend.
pub const DEFAULT_GCS_BUCKET: &str = "open-hots-ingress";
