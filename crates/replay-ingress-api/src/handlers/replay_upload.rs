use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::{Method, StatusCode};
use replay_ingress_core::UploadError;

use crate::error::HttpAppError;
use crate::services::replay_ingest::{buffer_replay_file, store_replay};
use crate::state::AppState;
use crate::utils::ip_extraction::SourceAddress;

/// Accept a replay upload (`POST`, `multipart/form-data`, file field `replayFile`).
///
/// Responds 200 with an empty body once the object is committed. Every failure
/// is reported by the stage that produced it; see `UploadError`.
#[tracing::instrument(
    skip_all,
    fields(method = %method, source_address = %source.0, object_name = tracing::field::Empty)
)]
pub async fn upload_replay(
    State(state): State<Arc<AppState>>,
    method: Method,
    source: SourceAddress,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, HttpAppError> {
    let storage = state.storage.get().await?;

    if method != Method::POST {
        return Err(UploadError::NotFound(format!("method {} not accepted", method)).into());
    }

    let mut multipart = multipart?;
    let payload =
        buffer_replay_file(&mut multipart, state.upload.max_upload_size_bytes).await?;

    let identity = store_replay(storage.as_ref(), &payload, &source.0).await?;

    let object_name = identity.object_name();
    tracing::Span::current().record("object_name", object_name.as_str());
    tracing::info!(
        file_hash = %identity.file_hash(),
        size_bytes = payload.len(),
        backend = %storage.backend_type(),
        "Replay stored"
    );

    Ok(StatusCode::OK)
}
