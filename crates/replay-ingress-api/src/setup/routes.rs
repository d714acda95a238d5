//! Route configuration

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::replay_upload::upload_replay;
use crate::state::AppState;

/// Allowance for multipart boundaries and part headers on top of the decoded
/// form ceiling, which the handler enforces itself.
pub const FORM_FRAMING_HEADROOM_BYTES: usize = 64 * 1024;

/// Every method and path reaches the upload handler, which owns the
/// 404 decision for anything but `POST`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .upload
        .max_upload_size_bytes
        .saturating_add(FORM_FRAMING_HEADROOM_BYTES);

    Router::new()
        .route("/", any(upload_replay))
        .fallback(upload_replay)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
