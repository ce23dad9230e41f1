use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AssetConfig, ValidationError};

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4"];

/// A named place on an owner record that holds asset keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    /// A user's profile picture
    UserAvatar,
    /// Ordered product gallery
    ProductAvatars,
    /// A product's single video
    ProductVideo,
}

/// How many keys a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    List,
}

impl AssetSlot {
    pub fn name(&self) -> &'static str {
        match self {
            AssetSlot::UserAvatar => "user_avatar",
            AssetSlot::ProductAvatars => "product_avatars",
            AssetSlot::ProductVideo => "product_video",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetSlot::UserAvatar | AssetSlot::ProductAvatars => IMAGE_EXTENSIONS,
            AssetSlot::ProductVideo => VIDEO_EXTENSIONS,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            AssetSlot::ProductAvatars => Cardinality::List,
            AssetSlot::UserAvatar | AssetSlot::ProductVideo => Cardinality::Single,
        }
    }

    /// Per-file byte cap for uploads into this slot
    pub fn max_file_bytes(&self, config: &AssetConfig) -> u64 {
        match self {
            AssetSlot::UserAvatar => config.avatar_max_bytes,
            AssetSlot::ProductAvatars | AssetSlot::ProductVideo => config.media_max_bytes,
        }
    }

    /// Reject filenames whose extension is not on this slot's allow-list.
    ///
    /// Matching is exact, so `photo.JPG` is rejected.
    pub fn check_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = extension_of(filename);
        if self.allowed_extensions().contains(&extension) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedExtension {
                filename: filename.to_string(),
                extension: extension.to_string(),
            })
        }
    }

    pub fn check_file_count(&self, count: usize) -> Result<(), ValidationError> {
        let (ok, expected) = match self.cardinality() {
            Cardinality::Single => (count == 1, "exactly one"),
            Cardinality::List => (count >= 1, "at least one"),
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::FileCount {
                slot: *self,
                expected,
                actual: count,
            })
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extension of the last path component including the dot, or `""`
pub fn extension_of(filename: &str) -> &str {
    let base_start = filename.rfind('/').map_or(0, |i| i + 1);
    match filename[base_start..].rfind('.') {
        Some(dot) => &filename[base_start + dot..],
        None => "",
    }
}
