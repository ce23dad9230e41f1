//! # mart-blob: blob storage for marketplace assets
//!
//! `mart-blob` holds the storage half of asset replacement: naming new blobs,
//! putting them into an object store and taking them out again.
//!
//! ## Key Features
//!
//! - **Date-sharded keys**: `YYYY/MM/DD/<token>_<filename>` so uploads can be found by day
//! - **Small error surface**: every backend failure maps to `NotFound`, `AccessDenied`,
//!   `BucketMissing` or `Unknown`
//! - **S3-compatible backend**: AWS, MinIO and RustFS through `aws-sdk-s3`
//! - **In-memory backend**: for tests and local demos
//!
//! ## Quick Start
//!
//! ```rust
//! use mart_blob::prelude::*;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = MemoryBlobStore::new();
//! let keys = DatedKeyGenerator::new();
//!
//! let key = keys.generate("avatar.png");
//! store.upload(key.as_str(), Bytes::from_static(b"\x89PNG")).await?;
//! assert!(store.contains(key.as_str()));
//!
//! store.delete(key.as_str()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  AssetReplacer  │  ← mart-assets: validation, ordering, compensation
//! ├─────────────────┤
//! │  KeyGenerator   │  ← naming
//! │  BlobStore      │  ← storage primitives (upload / delete)
//! └─────────────────┘
//! ```

mod config;
mod error;
mod key;
mod memory_store;
mod s3_store;
pub mod store;

pub use config::{ConfigError, S3Config};
pub use error::{BlobError, BlobResult};
pub use key::{
    dated_key, sanitize_filename, AssetKey, DatedKeyGenerator, KeyGenerator, DEFAULT_TOKEN_LEN,
};
pub use memory_store::MemoryBlobStore;
pub use s3_store::S3BlobStore;
pub use store::BlobStore;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AssetKey, BlobError, BlobResult, BlobStore, DatedKeyGenerator, KeyGenerator,
        MemoryBlobStore,
    };
}
