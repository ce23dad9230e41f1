use std::sync::Arc;

use mart_blob::{AssetKey, BlobStore, DatedKeyGenerator, KeyGenerator};
use serde::Serialize;
use tracing::{debug, field, info, instrument, warn, Span};
use uuid::Uuid;

use crate::{
    AssetError, AssetHolder, AssetResult, AssetSlot, EntityRepository, FileBuffer, ValidationError,
};

/// Keys involved in one replacement call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPlan {
    pub operation_id: Uuid,
    pub owner_id: u64,
    pub slot: AssetSlot,
    pub new_keys: Vec<AssetKey>,
    pub old_keys: Vec<AssetKey>,
}

/// Outcome of a successful replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementReport {
    pub operation_id: Uuid,
    pub owner_id: u64,
    pub slot: AssetSlot,
    /// Keys now stored in the slot
    pub new_keys: Vec<AssetKey>,
    /// Previous keys whose blobs were deleted
    pub removed_keys: Vec<AssetKey>,
}

/// Swaps the blobs behind an owner's asset slot.
///
/// A call runs validate → upload → persist → delete old blobs. If an upload
/// fails, blobs uploaded earlier in the same call are deleted. If reading or
/// writing the record fails, every blob uploaded by the call is deleted and
/// the record is left as it was. These compensating deletes are best effort:
/// failures are logged and the original error is returned.
///
/// Nothing here retries, and nothing is durable. A crash between upload and
/// persist orphans the new blobs; a crash after persist leaks the old ones.
///
/// Two concurrent calls for the same owner and slot are not serialised. The
/// later `update` wins; each call deletes the keys it saw before its own
/// update, so the loser's uploads are orphaned and a referenced blob can be
/// deleted. Callers needing stronger guarantees must lock per owner and slot
/// around [`AssetReplacer::replace`].
///
/// Dropping the future cancels at the next `.await`. No compensation runs
/// for blobs uploaded before the drop.
pub struct AssetReplacer<R> {
    repository: R,
    store: Arc<dyn BlobStore>,
    keys: Arc<dyn KeyGenerator>,
}

impl<R: EntityRepository> AssetReplacer<R> {
    /// Create a replacer with date-sharded keys
    pub fn new<S: BlobStore + 'static>(repository: R, store: S) -> Self {
        Self {
            repository,
            store: Arc::new(store),
            keys: Arc::new(DatedKeyGenerator::new()),
        }
    }

    /// Create from shared components
    pub fn from_parts(
        repository: R,
        store: Arc<dyn BlobStore>,
        keys: Arc<dyn KeyGenerator>,
    ) -> Self {
        Self {
            repository,
            store,
            keys,
        }
    }

    /// Use a custom key strategy
    pub fn with_key_generator<K: KeyGenerator + 'static>(mut self, keys: K) -> Self {
        self.keys = Arc::new(keys);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Replace the contents of `slot` on `owner_id` with `files`, in order.
    ///
    /// Errors from deleting the previous blobs are returned even though the
    /// record already points at the new keys.
    #[instrument(
        skip(self, files),
        fields(
            owner_id = owner_id,
            slot = %slot,
            files = files.len(),
            backend = self.store.backend_name(),
            operation_id = field::Empty,
        )
    )]
    pub async fn replace(
        &self,
        owner_id: u64,
        slot: AssetSlot,
        files: Vec<FileBuffer>,
    ) -> AssetResult<ReplacementReport> {
        let operation_id = Uuid::new_v4();
        Span::current().record("operation_id", field::display(operation_id));
        info!("replacing assets");

        Self::validate(slot, &files)?;

        let new_keys = self.upload_all(files).await?;
        let plan = self.persist(operation_id, owner_id, slot, new_keys).await?;
        let removed_keys = self.remove_old(&plan).await?;

        info!(
            new = plan.new_keys.len(),
            removed = removed_keys.len(),
            "assets replaced"
        );

        Ok(ReplacementReport {
            operation_id,
            owner_id,
            slot,
            new_keys: plan.new_keys,
            removed_keys,
        })
    }

    fn validate(slot: AssetSlot, files: &[FileBuffer]) -> Result<(), ValidationError> {
        if !R::Record::supports(slot) {
            return Err(ValidationError::UnsupportedSlot { slot });
        }
        slot.check_file_count(files.len())?;
        files
            .iter()
            .try_for_each(|file| slot.check_extension(file.filename()))
    }

    async fn upload_all(&self, files: Vec<FileBuffer>) -> AssetResult<Vec<AssetKey>> {
        let mut uploaded = Vec::with_capacity(files.len());

        for file in files {
            let (filename, body) = file.into_parts();
            let key = self.keys.generate(&filename);
            debug!(%key, size = body.len(), "uploading blob");

            if let Err(err) = self.store.upload(key.as_str(), body).await {
                warn!(%key, error = %err, "upload failed");
                self.discard(&uploaded).await;
                return Err(err.into());
            }
            uploaded.push(key);
        }

        Ok(uploaded)
    }

    async fn persist(
        &self,
        operation_id: Uuid,
        owner_id: u64,
        slot: AssetSlot,
        new_keys: Vec<AssetKey>,
    ) -> AssetResult<ReplacementPlan> {
        let mut record = match self.repository.get(owner_id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "cannot load owner record");
                self.discard(&new_keys).await;
                return Err(err.into());
            }
        };

        let old_keys = record.slot_keys(slot);
        record.set_slot_keys(slot, new_keys.clone());

        if let Err(err) = self.repository.update(owner_id, record).await {
            warn!(error = %err, "cannot update owner record");
            self.discard(&new_keys).await;
            return Err(err.into());
        }

        Ok(ReplacementPlan {
            operation_id,
            owner_id,
            slot,
            new_keys,
            old_keys,
        })
    }

    /// Delete the blobs the slot used to point at.
    ///
    /// Every non-empty old key is attempted; the first failure is returned.
    async fn remove_old(&self, plan: &ReplacementPlan) -> AssetResult<Vec<AssetKey>> {
        let mut removed = Vec::new();
        let mut first_error = None;

        // never delete a key the record now references
        let stale = plan
            .old_keys
            .iter()
            .filter(|key| !key.is_empty() && !plan.new_keys.contains(key));

        for key in stale {
            match self.store.delete(key.as_str()).await {
                Ok(()) => {
                    debug!(%key, "deleted previous blob");
                    removed.push(key.clone());
                }
                Err(err) => {
                    warn!(%key, error = %err, "cannot delete previous blob");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(AssetError::Blob(err)),
            None => Ok(removed),
        }
    }

    async fn discard(&self, keys: &[AssetKey]) {
        if keys.is_empty() {
            return;
        }
        warn!(count = keys.len(), "rolling back uploaded blobs");

        for key in keys {
            if let Err(err) = self.store.delete(key.as_str()).await {
                warn!(%key, error = %err, "rollback delete failed, blob orphaned");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryRepository, ProductRecord, RepositoryError, UserRecord};
    use mart_blob::MemoryBlobStore;
    use tracing_test::traced_test;

    fn png(name: &str) -> FileBuffer {
        FileBuffer::from_bytes(name, b"\x89PNG")
    }

    #[tokio::test]
    async fn first_avatar_upload_sets_key() {
        let store = MemoryBlobStore::new();
        let users = MemoryRepository::new();
        users.insert(1, UserRecord::new(1, "ann"));

        let replacer = AssetReplacer::new(users.clone(), store.clone());
        let report = replacer
            .replace(1, AssetSlot::UserAvatar, vec![png("me.png")])
            .await
            .unwrap();

        assert_eq!(report.new_keys.len(), 1);
        assert!(report.removed_keys.is_empty());
        assert_eq!(users.record(1).unwrap().avatar, report.new_keys[0]);
        assert_eq!(store.keys(), vec![report.new_keys[0].to_string()]);
    }

    #[tokio::test]
    async fn wrong_record_type_is_rejected_up_front() {
        let store = MemoryBlobStore::new();
        let users: MemoryRepository<UserRecord> = MemoryRepository::new();
        let replacer = AssetReplacer::new(users, store.clone());

        let err = replacer
            .replace(1, AssetSlot::ProductVideo, vec![FileBuffer::from_bytes("a.mp4", b"v")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AssetError::Validation(ValidationError::UnsupportedSlot {
                slot: AssetSlot::ProductVideo
            })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn old_key_reused_as_new_key_is_kept() {
        struct FixedKey;
        impl KeyGenerator for FixedKey {
            fn generate(&self, _filename: &str) -> AssetKey {
                AssetKey::from("fixed/key.png")
            }
        }

        let store = MemoryBlobStore::new();
        store.insert("fixed/key.png", bytes::Bytes::from_static(b"old"));
        let products = MemoryRepository::new();
        products.insert(3, ProductRecord::new(3, "lamp", 1).with_images(["fixed/key.png"]));

        let replacer = AssetReplacer::new(products, store.clone()).with_key_generator(FixedKey);
        let report = replacer
            .replace(3, AssetSlot::ProductAvatars, vec![png("a.png")])
            .await
            .unwrap();

        assert!(report.removed_keys.is_empty());
        assert!(store.contains("fixed/key.png"));
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_owner_rolls_back_upload() {
        let store = MemoryBlobStore::new();
        let users: MemoryRepository<UserRecord> = MemoryRepository::new();
        let replacer = AssetReplacer::new(users, store.clone());

        let err = replacer
            .replace(42, AssetSlot::UserAvatar, vec![png("me.png")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AssetError::Persistence(RepositoryError::NotFound { owner_id: 42 })
        ));
        assert!(store.is_empty());
        assert!(logs_contain("rolling back uploaded blobs"));
    }

    #[traced_test]
    #[tokio::test]
    async fn span_carries_owner_and_operation() {
        let users = MemoryRepository::new();
        users.insert(4242, UserRecord::new(4242, "cy"));
        let replacer = AssetReplacer::new(users, MemoryBlobStore::new());

        let report = replacer
            .replace(4242, AssetSlot::UserAvatar, vec![png("a.png")])
            .await
            .unwrap();

        assert!(logs_contain("owner_id=4242"));
        assert!(logs_contain(&format!("operation_id={}", report.operation_id)));
    }
}
