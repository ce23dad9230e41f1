use std::sync::Arc;

use mart_blob::{BlobStore, DatedKeyGenerator, KeyGenerator};
use tracing::instrument;

use crate::{
    AssetConfig, AssetReplacer, AssetResult, AssetSlot, EntityRepository, FrameSource,
    ProductRecord, ReplacementReport, StreamDemuxer, UserRecord,
};

/// Entry points for the three upload streams.
///
/// Each call drains its frame source with the slot's size cap, then hands the
/// files to the matching replacer. Nothing is uploaded until the whole stream
/// has been received and validated.
pub struct AssetService<U, P> {
    users: AssetReplacer<U>,
    products: AssetReplacer<P>,
    config: AssetConfig,
}

impl<U, P> AssetService<U, P>
where
    U: EntityRepository<Record = UserRecord>,
    P: EntityRepository<Record = ProductRecord>,
{
    pub fn new<S: BlobStore + 'static>(
        users: U,
        products: P,
        store: S,
        config: AssetConfig,
    ) -> Self {
        let keys = DatedKeyGenerator::new().with_token_len(config.key_token_len);
        Self::from_parts(users, products, Arc::new(store), Arc::new(keys), config)
    }

    /// Build with a shared store and key strategy
    pub fn from_parts(
        users: U,
        products: P,
        store: Arc<dyn BlobStore>,
        keys: Arc<dyn KeyGenerator>,
        config: AssetConfig,
    ) -> Self {
        Self {
            users: AssetReplacer::from_parts(users, Arc::clone(&store), Arc::clone(&keys)),
            products: AssetReplacer::from_parts(products, store, keys),
            config,
        }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    pub fn users(&self) -> &AssetReplacer<U> {
        &self.users
    }

    pub fn products(&self) -> &AssetReplacer<P> {
        &self.products
    }

    /// Replace a user's avatar with the single image in `source`
    pub async fn update_user_avatar<F: FrameSource>(
        &self,
        source: F,
    ) -> AssetResult<ReplacementReport> {
        receive(&self.users, &self.config, AssetSlot::UserAvatar, source).await
    }

    /// Replace a product's gallery with the images in `source`, in order
    pub async fn update_product_avatars<F: FrameSource>(
        &self,
        source: F,
    ) -> AssetResult<ReplacementReport> {
        receive(&self.products, &self.config, AssetSlot::ProductAvatars, source).await
    }

    /// Replace a product's video with the single clip in `source`
    pub async fn update_product_video<F: FrameSource>(
        &self,
        source: F,
    ) -> AssetResult<ReplacementReport> {
        receive(&self.products, &self.config, AssetSlot::ProductVideo, source).await
    }
}

#[instrument(skip_all, fields(slot = %slot))]
async fn receive<R, F>(
    replacer: &AssetReplacer<R>,
    config: &AssetConfig,
    slot: AssetSlot,
    source: F,
) -> AssetResult<ReplacementReport>
where
    R: EntityRepository,
    F: FrameSource,
{
    let upload = StreamDemuxer::new(source, slot.max_file_bytes(config))
        .collect()
        .await?;
    replacer.replace(upload.owner_id, slot, upload.files).await
}
