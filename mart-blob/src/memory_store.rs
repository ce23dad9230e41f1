use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::{BlobError, BlobResult, BlobStore};

/// In-process blob store.
///
/// Clones share the same underlying map, so a test can keep a handle and
/// inspect what the pipeline left behind.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.read().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.blobs.read().get(key).cloned()
    }

    /// All stored keys in lexical order
    pub fn keys(&self) -> Vec<String> {
        self.blobs.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Seed a blob directly, bypassing the trait
    pub fn insert<K: Into<String>>(&self, key: K, body: Bytes) {
        self.blobs.write().insert(key.into(), body);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, body: Bytes) -> BlobResult<()> {
        self.blobs.write().insert(key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        match self.blobs.write().remove(key) {
            Some(_) => Ok(()),
            None => Err(BlobError::not_found(key)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
