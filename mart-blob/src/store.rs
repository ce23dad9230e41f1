use async_trait::async_trait;
use bytes::Bytes;

use crate::BlobResult;

/// Blob storage operations used by the asset pipeline.
///
/// Each call is a single round trip to the backend. Nothing is atomic across
/// calls: a failed `upload` after a successful one leaves the first blob in
/// place until someone deletes it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `key`, overwriting whatever was there
    async fn upload(&self, key: &str, body: Bytes) -> BlobResult<()>;

    /// Delete the blob stored under `key`
    async fn delete(&self, key: &str) -> BlobResult<()>;

    /// Human-readable backend name for logs
    fn backend_name(&self) -> &'static str {
        "blob-store"
    }
}

#[async_trait]
impl<T> BlobStore for std::sync::Arc<T>
where
    T: BlobStore + ?Sized,
{
    async fn upload(&self, key: &str, body: Bytes) -> BlobResult<()> {
        (**self).upload(key, body).await
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        (**self).delete(key).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
