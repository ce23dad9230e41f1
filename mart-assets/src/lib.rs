//! # mart-assets: streaming asset replacement
//!
//! Replaces the files behind an owner's asset slot (a user avatar, a product
//! gallery or a product video) without leaving the record pointing at a
//! missing blob.
//!
//! ## Key Features
//!
//! - **Frame demultiplexing**: `OwnerId Filename Chunk* (Filename Chunk*)*` into whole files,
//!   with a per-file size cap checked chunk by chunk
//! - **Validate before I/O**: extension and file count are checked before anything is uploaded
//! - **Compensation**: failed uploads or record writes delete the blobs this call created
//! - **Pluggable storage**: any [`mart_blob::BlobStore`] and any [`EntityRepository`]
//!
//! ## Quick Start
//!
//! ```rust
//! use mart_assets::prelude::*;
//! use mart_blob::MemoryBlobStore;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> AssetResult<()> {
//! let users = MemoryRepository::new();
//! users.insert(1, UserRecord::new(1, "ann"));
//! let products = MemoryRepository::<ProductRecord>::new();
//! let store = MemoryBlobStore::new();
//! let service = AssetService::new(users, products, store, AssetConfig::default());
//!
//! let frames = FrameEncoder::default().encode(1, [("me.png", Bytes::from_static(b"\x89PNG"))]);
//! let report = service.update_user_avatar(frames).await?;
//! assert_eq!(report.new_keys.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Flow
//!
//! ```text
//! frames ─► StreamDemuxer ─► validate ─► upload ─► get/update ─► delete old
//!                                          │            │
//!                                          └─ delete new blobs on failure
//! ```

mod config;
mod demux;
mod encoder;
mod error;
mod frame;
mod records;
mod replacer;
mod repository;
mod service;
mod slot;

#[cfg(feature = "tracing-basic")]
pub mod observability;

pub use config::{AssetConfig, ENV_PREFIX};
pub use demux::{DemuxPhase, DemuxedUpload, FileBuffer, StreamDemuxer};
pub use encoder::{FrameEncoder, FrameStream};
pub use error::{
    AssetError, AssetResult, ErrorKind, RepositoryError, TransferError, ValidationError,
};
pub use frame::{Frame, FrameSource};
pub use records::{ProductRecord, UserRecord};
pub use replacer::{AssetReplacer, ReplacementPlan, ReplacementReport};
pub use repository::{AssetHolder, EntityRepository, MemoryRepository};
pub use service::AssetService;
pub use slot::{extension_of, AssetSlot, Cardinality};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AssetConfig, AssetError, AssetResult, AssetService, AssetSlot, EntityRepository,
        FileBuffer, Frame, FrameEncoder, FrameSource, MemoryRepository, ProductRecord,
        ReplacementReport, UserRecord,
    };

    pub use async_trait::async_trait;
}
