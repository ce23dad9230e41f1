use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use tracing::{info, warn};

use mart_assets::{
    AssetConfig, AssetService, FrameEncoder, MemoryRepository, ProductRecord, ReplacementReport,
    UserRecord, ENV_PREFIX,
};
use mart_blob::{BlobStore, DatedKeyGenerator, MemoryBlobStore, S3BlobStore};

const USER_ID: u64 = 1;
const PRODUCT_ID: u64 = 42;

#[tokio::main]
async fn main() -> Result<()> {
    mart_assets::observability::init_tracing();

    let config = AssetConfig::from_env(ENV_PREFIX)?;
    let store = open_store().await;

    let users = MemoryRepository::new();
    users.insert(USER_ID, UserRecord::new(USER_ID, "ann"));
    let products = MemoryRepository::new();
    products.insert(PRODUCT_ID, ProductRecord::new(PRODUCT_ID, "desk lamp", 7));

    let encoder = FrameEncoder::new(config.chunk_size);
    let keys = DatedKeyGenerator::new().with_token_len(config.key_token_len);
    let service = AssetService::from_parts(
        users.clone(),
        products.clone(),
        store,
        Arc::new(keys),
        config,
    );

    // first avatar, then a replacement that removes it
    for name in ["first.png", "second.jpg"] {
        let frames = encoder.encode(USER_ID, [(name, fake_image(name))]);
        print_report(&service.update_user_avatar(frames).await?)?;
    }

    let gallery = ["front.png", "side.png", "back.jpeg"].map(|name| (name, fake_image(name)));
    print_report(&service.update_product_avatars(encoder.encode(PRODUCT_ID, gallery)).await?)?;

    let video = encoder.encode(PRODUCT_ID, [("tour.mp4", Bytes::from(vec![0u8; 256 * 1024]))]);
    print_report(&service.update_product_video(video).await?)?;

    // rejected before anything is uploaded
    let frames = encoder.encode(USER_ID, [("anim.gif", fake_image("anim.gif"))]);
    if let Err(err) = service.update_user_avatar(frames).await {
        warn!(status = err.status_code(), kind = err.kind().name(), "{err}");
    }

    info!(
        avatar = %users.record(USER_ID).map(|u| u.avatar).unwrap_or_default(),
        images = products.record(PRODUCT_ID).map(|p| p.image_links.len()).unwrap_or_default(),
        "final state"
    );

    Ok(())
}

async fn open_store() -> Arc<dyn BlobStore> {
    match S3BlobStore::from_env().await {
        Ok(store) => {
            info!(bucket = store.bucket(), "using S3 store");
            Arc::new(store)
        }
        Err(err) => {
            info!(reason = %err, "S3 not configured, using in-memory store");
            Arc::new(MemoryBlobStore::new())
        }
    }
}

fn fake_image(name: &str) -> Bytes {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(name.as_bytes());
    Bytes::from(data)
}

fn print_report(report: &ReplacementReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
