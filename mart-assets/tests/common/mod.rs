#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use mart_assets::{AssetHolder, EntityRepository, MemoryRepository, RepositoryError};
use mart_blob::{AssetKey, BlobError, BlobResult, BlobStore, KeyGenerator, MemoryBlobStore};

/// In-memory store that records every call and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingBlobStore {
    pub inner: MemoryBlobStore,
    uploads: Arc<Mutex<Vec<String>>>,
    deletes: Arc<Mutex<Vec<String>>>,
    fail_upload_at: Option<usize>,
    fail_deletes_of: Arc<Mutex<Vec<String>>>,
}

impl RecordingBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `n`th upload call (1-based) fails with `AccessDenied`
    pub fn failing_upload_at(mut self, n: usize) -> Self {
        self.fail_upload_at = Some(n);
        self
    }

    /// Deleting `key` fails with `Unknown`
    pub fn fail_delete_of(&self, key: &str) {
        self.fail_deletes_of.lock().push(key.to_string());
    }

    pub fn seed(&self, key: &str) {
        self.inner.insert(key, Bytes::from_static(b"old"));
    }

    /// Keys passed to `upload`, failed attempts included
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().clone()
    }

    /// Keys passed to `delete`, failed attempts included
    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn upload(&self, key: &str, body: Bytes) -> BlobResult<()> {
        let call = {
            let mut uploads = self.uploads.lock();
            uploads.push(key.to_string());
            uploads.len()
        };
        if self.fail_upload_at == Some(call) {
            return Err(BlobError::access_denied(key, "injected upload failure"));
        }
        self.inner.upload(key, body).await
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.deletes.lock().push(key.to_string());
        if self.fail_deletes_of.lock().iter().any(|k| k == key) {
            return Err(BlobError::unknown("injected delete failure"));
        }
        self.inner.delete(key).await
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// How the repository should misbehave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoFault {
    None,
    GetBackend,
    UpdateNotFound,
}

/// Memory repository with call counters and fault injection
pub struct RecordingRepository<R> {
    pub inner: MemoryRepository<R>,
    gets: AtomicUsize,
    updates: AtomicUsize,
    fault: RepoFault,
}

impl<R: AssetHolder> RecordingRepository<R> {
    pub fn new(inner: MemoryRepository<R>) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            fault: RepoFault::None,
        }
    }

    pub fn with_fault(mut self, fault: RepoFault) -> Self {
        self.fault = fault;
        self
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: AssetHolder> EntityRepository for RecordingRepository<R> {
    type Record = R;

    async fn get(&self, owner_id: u64) -> Result<R, RepositoryError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fault == RepoFault::GetBackend {
            return Err(RepositoryError::backend(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "database unavailable",
            )));
        }
        self.inner.get(owner_id).await
    }

    async fn update(&self, owner_id: u64, record: R) -> Result<(), RepositoryError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fault == RepoFault::UpdateNotFound {
            return Err(RepositoryError::NotFound { owner_id });
        }
        self.inner.update(owner_id, record).await
    }
}

/// Predictable keys: `new/<n>_<filename>`
#[derive(Default)]
pub struct SequentialKeys {
    next: AtomicUsize,
}

impl KeyGenerator for SequentialKeys {
    fn generate(&self, filename: &str) -> AssetKey {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        AssetKey::from(format!("new/{n}_{filename}"))
    }
}

pub fn file(name: &str, data: &'static [u8]) -> (String, Bytes) {
    (name.to_string(), Bytes::from_static(data))
}
