//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Every `UploadError` renders as its
//! status code and short plain-text message; the detail it carries is logged and
//! never sent to the client.

use axum::{
    extract::multipart::MultipartRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use replay_ingress_core::{ErrorMetadata, LogLevel, UploadError};

/// Wrapper type for UploadError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for UploadError (external type from replay-ingress-core)
#[derive(Debug)]
pub struct HttpAppError(pub UploadError);

impl From<UploadError> for HttpAppError {
    fn from(err: UploadError) -> Self {
        HttpAppError(err)
    }
}

/// A request that is not `multipart/form-data` at all fails the parse stage.
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(UploadError::FormParse(rejection.body_text()))
    }
}

fn log_error(error: &UploadError) {
    let error_type = error.error_type();
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, error_code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, error_code, "Upload rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, error_code, "Upload failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.0);

        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = self.0.client_message();

        (
            status,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            body,
        )
            .into_response()
    }
}
