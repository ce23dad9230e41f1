use mart_blob::AssetKey;
use serde::{Deserialize, Serialize};

use crate::{AssetHolder, AssetSlot};

/// The asset-bearing part of a user row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub email: String,
    /// Empty until the first upload
    pub avatar: AssetKey,
}

impl UserRecord {
    pub fn new<S: Into<String>>(id: u64, username: S) -> Self {
        Self {
            id,
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_avatar<K: Into<AssetKey>>(mut self, avatar: K) -> Self {
        self.avatar = avatar.into();
        self
    }
}

impl AssetHolder for UserRecord {
    const SLOTS: &'static [AssetSlot] = &[AssetSlot::UserAvatar];

    fn slot_keys(&self, slot: AssetSlot) -> Vec<AssetKey> {
        match slot {
            AssetSlot::UserAvatar => vec![self.avatar.clone()],
            AssetSlot::ProductAvatars | AssetSlot::ProductVideo => Vec::new(),
        }
    }

    fn set_slot_keys(&mut self, slot: AssetSlot, keys: Vec<AssetKey>) {
        if slot == AssetSlot::UserAvatar {
            self.avatar = keys.into_iter().next().unwrap_or_default();
        }
    }
}

/// The asset-bearing part of a product row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    pub title: String,
    pub shop_id: u64,
    /// Gallery images in display order
    pub image_links: Vec<AssetKey>,
    pub video_link: AssetKey,
}

impl ProductRecord {
    pub fn new<S: Into<String>>(id: u64, title: S, shop_id: u64) -> Self {
        Self {
            id,
            title: title.into(),
            shop_id,
            ..Self::default()
        }
    }

    pub fn with_images<I, K>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<AssetKey>,
    {
        self.image_links = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_video<K: Into<AssetKey>>(mut self, video: K) -> Self {
        self.video_link = video.into();
        self
    }
}

impl AssetHolder for ProductRecord {
    const SLOTS: &'static [AssetSlot] = &[AssetSlot::ProductAvatars, AssetSlot::ProductVideo];

    fn slot_keys(&self, slot: AssetSlot) -> Vec<AssetKey> {
        match slot {
            AssetSlot::ProductAvatars => self.image_links.clone(),
            AssetSlot::ProductVideo => vec![self.video_link.clone()],
            AssetSlot::UserAvatar => Vec::new(),
        }
    }

    fn set_slot_keys(&mut self, slot: AssetSlot, keys: Vec<AssetKey>) {
        match slot {
            AssetSlot::ProductAvatars => self.image_links = keys,
            AssetSlot::ProductVideo => {
                self.video_link = keys.into_iter().next().unwrap_or_default()
            }
            AssetSlot::UserAvatar => {}
        }
    }
}
