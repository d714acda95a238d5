//! Replay ingest pipeline: buffer the uploaded file, derive its identity, and
//! persist it through a single write stream.

use axum::extract::multipart::{Multipart, MultipartError};
use replay_ingress_core::constants::{REPLAY_CONTENT_TYPE, REPLAY_FILE_FIELD};
use replay_ingress_core::{ReplayIdentity, UploadError};
use replay_ingress_storage::{ObjectAttributes, ObjectStorage};

const WRITE_CHUNK_SIZE: usize = 64 * 1024;

/// Parse the whole form and return the contents of its `replayFile` part.
///
/// Every part is read to the end, so a malformed form is rejected even when
/// the replay itself arrived intact. Part contents count towards
/// `max_form_bytes`. Only file parts count as the replay, and the first one
/// wins; a plain text field named `replayFile` is treated as absent.
pub async fn buffer_replay_file(
    multipart: &mut Multipart,
    max_form_bytes: usize,
) -> Result<Vec<u8>, UploadError> {
    let mut form_bytes = 0usize;
    let mut replay: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::FormParse(e.body_text()))?
    {
        let is_replay = replay.is_none()
            && field.name() == Some(REPLAY_FILE_FIELD)
            && field.file_name().is_some();

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| chunk_error(e, is_replay))?
        {
            form_bytes = form_bytes.saturating_add(chunk.len());
            if form_bytes > max_form_bytes {
                return Err(UploadError::FormParse(format!(
                    "form upload exceeds {} bytes",
                    max_form_bytes
                )));
            }
            if is_replay {
                data.extend_from_slice(&chunk);
            }
        }

        if is_replay {
            replay = Some(data);
        }
    }

    replay.ok_or_else(|| {
        UploadError::MissingReplayFile(format!(
            "form upload has no '{}' file part",
            REPLAY_FILE_FIELD
        ))
    })
}

// Malformed framing and the body limit are client errors and fail the parse.
// Anything else is an I/O failure, which only counts as a read failure while
// the replay part itself is being buffered.
fn chunk_error(err: MultipartError, in_replay_file: bool) -> UploadError {
    if in_replay_file && !err.status().is_client_error() {
        UploadError::ReadReplayFile(err.body_text())
    } else {
        UploadError::FormParse(err.body_text())
    }
}

/// Write `payload` to storage under its content identity.
///
/// A write failure aborts the stream without finalizing it, so no object
/// becomes visible.
pub async fn store_replay(
    storage: &dyn ObjectStorage,
    payload: &[u8],
    source_address: &str,
) -> Result<ReplayIdentity, UploadError> {
    let identity = ReplayIdentity::capture(payload);
    let object_name = identity.object_name();
    let attributes = ObjectAttributes::new(REPLAY_CONTENT_TYPE)
        .with_metadata(identity.metadata(source_address));

    let mut writer = storage
        .create_writer(&object_name, attributes)
        .await
        .map_err(|e| UploadError::WriteReplayFile(e.to_string()))?;

    for chunk in payload.chunks(WRITE_CHUNK_SIZE) {
        if let Err(e) = writer.write(chunk).await {
            if let Err(abort_err) = writer.abort().await {
                tracing::warn!(
                    error = %abort_err,
                    object_name = %object_name,
                    "Failed to abort replay write"
                );
            }
            return Err(UploadError::WriteReplayFile(e.to_string()));
        }
    }

    writer
        .finalize()
        .await
        .map_err(|e| UploadError::FinalizeUpload(e.to_string()))?;

    Ok(identity)
}
