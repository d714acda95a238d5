pub mod storage;

use std::sync::Arc;

use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use replay_ingress_api::setup::routes::build_router;
use replay_ingress_api::{AppState, StorageHandle, UploadConfig};
use replay_ingress_storage::ObjectStorage;

use storage::{Fault, RecordingStorage};

/// Body limit used by test servers; small so oversize cases stay cheap.
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Test application with the storage it writes to
pub struct TestApp {
    server: TestServer,
    pub storage: Arc<RecordingStorage>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn upload_config(trusted_proxy_count: usize) -> UploadConfig {
    UploadConfig {
        max_upload_size_bytes: TEST_MAX_UPLOAD_BYTES,
        trusted_proxy_count,
    }
}

pub fn test_router(storage: StorageHandle, upload: UploadConfig) -> Router {
    let state = Arc::new(AppState::new(storage, upload));
    build_router(state)
}

pub fn test_server(storage: StorageHandle, upload: UploadConfig) -> TestServer {
    let app = test_router(storage, upload);
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

/// Handle over a fresh recording store, for tests that drive the router directly.
pub fn recording_storage(fault: Fault) -> (StorageHandle, Arc<RecordingStorage>) {
    let storage = Arc::new(RecordingStorage::new(fault));
    let handle = StorageHandle::ready(storage.clone() as Arc<dyn ObjectStorage>);
    (handle, storage)
}

/// App backed by in-memory storage, with `fault` injected into its writers.
pub fn setup_test_app_with(fault: Fault, trusted_proxy_count: usize) -> TestApp {
    let (handle, storage) = recording_storage(fault);
    TestApp {
        server: test_server(handle, upload_config(trusted_proxy_count)),
        storage,
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(Fault::None, 0)
}

/// Form with `data` as the `replayFile` part.
pub fn replay_form(data: &[u8]) -> MultipartForm {
    let part = Part::bytes(Bytes::copy_from_slice(data))
        .file_name("match.StormReplay")
        .mime_type("application/octet-stream");
    MultipartForm::new().add_part("replayFile", part)
}

/// Content type for hand-built multipart bodies using boundary `XYZ`.
pub const RAW_FORM_CONTENT_TYPE: &str = "multipart/form-data; boundary=XYZ";

/// Opening boundary and headers of a `replayFile` part, followed by `content`.
pub fn raw_replay_part(content: &str) -> String {
    format!(
        "--XYZ\r\n\
         Content-Disposition: form-data; name=\"replayFile\"; filename=\"match.StormReplay\"\r\n\
         Content-Type: application/octet-stream\r\n\
         \r\n\
         {}",
        content
    )
}
