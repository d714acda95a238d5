//! Error types module
//!
//! Every failure of the upload pipeline is one `UploadError` variant, one per
//! stage. The variant decides the HTTP status, the short message that crosses
//! to the client, and the level it is logged at. The inner `String` carries the
//! diagnostic detail and is only ever logged.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like routing mismatches
    Debug,
    /// Warning level - for client input problems
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FORM_PARSE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message; never contains internal detail
    fn client_message(&self) -> &'static str;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Storage client unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to parse form upload: {0}")]
    FormParse(String),

    #[error("Failed to extract replay file: {0}")]
    MissingReplayFile(String),

    #[error("Failed to read replay file: {0}")]
    ReadReplayFile(String),

    #[error("Failed to write replay file: {0}")]
    WriteReplayFile(String),

    #[error("Failed to finalize upload: {0}")]
    FinalizeUpload(String),
}

/// Static metadata for each variant: (http_status, error_code, client_message, log_level).
fn upload_error_static_metadata(err: &UploadError) -> (u16, &'static str, &'static str, LogLevel) {
    match err {
        UploadError::StorageUnavailable(_) => (
            500,
            "STORAGE_UNAVAILABLE",
            "failed to initialize storage client",
            LogLevel::Error,
        ),
        UploadError::NotFound(_) => (404, "NOT_FOUND", "404 page not found\n", LogLevel::Debug),
        UploadError::FormParse(_) => (
            400,
            "FORM_PARSE_ERROR",
            "failed to parse form upload",
            LogLevel::Warn,
        ),
        UploadError::MissingReplayFile(_) => (
            500,
            "REPLAY_FILE_MISSING",
            "failed to extract replay file from form upload",
            LogLevel::Error,
        ),
        UploadError::ReadReplayFile(_) => (
            500,
            "REPLAY_FILE_READ_ERROR",
            "failed to read replay file from form upload",
            LogLevel::Error,
        ),
        UploadError::WriteReplayFile(_) => (
            500,
            "STORAGE_WRITE_ERROR",
            "failed to write replay file",
            LogLevel::Error,
        ),
        UploadError::FinalizeUpload(_) => (
            500,
            "STORAGE_FINALIZE_ERROR",
            "failed to finalize upload",
            LogLevel::Error,
        ),
    }
}

impl UploadError {
    /// Get error type name for logging
    pub fn error_type(&self) -> &'static str {
        match self {
            UploadError::StorageUnavailable(_) => "StorageUnavailable",
            UploadError::NotFound(_) => "NotFound",
            UploadError::FormParse(_) => "FormParse",
            UploadError::MissingReplayFile(_) => "MissingReplayFile",
            UploadError::ReadReplayFile(_) => "ReadReplayFile",
            UploadError::WriteReplayFile(_) => "WriteReplayFile",
            UploadError::FinalizeUpload(_) => "FinalizeUpload",
        }
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn client_message(&self) -> &'static str {
        upload_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).3
    }
}
