//! In-memory storage that records writer calls and can inject failures.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use replay_ingress_storage::{
    CloudStorage, ObjectAttributes, ObjectStorage, ObjectWriter, StorageBackend, StorageError,
    StorageResult, StoredObject,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    Write,
    Finalize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterCall {
    Create(String),
    Write(usize),
    Finalize,
    Abort,
}

pub struct RecordingStorage {
    inner: CloudStorage,
    fault: Fault,
    calls: Arc<Mutex<Vec<WriterCall>>>,
}

impl RecordingStorage {
    pub fn new(fault: Fault) -> Self {
        Self {
            inner: CloudStorage::in_memory(),
            fault,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<WriterCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Names passed to `create_writer`, in order.
    pub fn created_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                WriterCall::Create(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, expected: &WriterCall) -> usize {
        self.calls().iter().filter(|call| *call == expected).count()
    }

    fn record(&self, call: WriterCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn create_writer(
        &self,
        name: &str,
        attributes: ObjectAttributes,
    ) -> StorageResult<Box<dyn ObjectWriter>> {
        self.record(WriterCall::Create(name.to_string()));
        let inner = self.inner.create_writer(name, attributes).await?;
        Ok(Box::new(RecordingWriter {
            inner,
            fault: self.fault,
            calls: self.calls.clone(),
        }))
    }

    async fn read(&self, name: &str) -> StorageResult<StoredObject> {
        self.inner.read(name).await
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        self.inner.exists(name).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

struct RecordingWriter {
    inner: Box<dyn ObjectWriter>,
    fault: Fault,
    calls: Arc<Mutex<Vec<WriterCall>>>,
}

impl RecordingWriter {
    fn record(&self, call: WriterCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectWriter for RecordingWriter {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        self.record(WriterCall::Write(chunk.len()));
        if self.fault == Fault::Write {
            return Err(StorageError::WriteFailed("injected write failure".to_string()));
        }
        self.inner.write(chunk).await
    }

    async fn finalize(self: Box<Self>) -> StorageResult<()> {
        self.record(WriterCall::Finalize);
        if self.fault == Fault::Finalize {
            self.inner.abort().await?;
            return Err(StorageError::FinalizeFailed(
                "injected finalize failure".to_string(),
            ));
        }
        self.inner.finalize().await
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        self.record(WriterCall::Abort);
        self.inner.abort().await
    }
}
