use mart_blob::{ConfigError, DEFAULT_TOKEN_LEN};

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "MART_ASSETS__";

/// Limits and tuning for asset uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetConfig {
    /// Per-file cap for single avatar uploads
    pub avatar_max_bytes: u64,

    /// Per-file cap for avatar lists and videos
    pub media_max_bytes: u64,

    /// Chunk size used when encoding outbound frames.
    /// Kept under the 4 MiB default gRPC message limit.
    pub chunk_size: usize,

    /// Length of the random token in generated keys
    pub key_token_len: usize,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            avatar_max_bytes: 8 * 1024 * 1024,        // 8MB
            media_max_bytes: 70 * 1024 * 1024,        // 70MB
            chunk_size: 3 * 1024 * 1024 + 512 * 1024, // 3.5MB
            key_token_len: DEFAULT_TOKEN_LEN,
        }
    }
}

impl AssetConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_avatar_max_bytes(mut self, bytes: u64) -> Self {
        self.avatar_max_bytes = bytes;
        self
    }

    pub fn with_media_max_bytes(mut self, bytes: u64) -> Self {
        self.media_max_bytes = bytes;
        self
    }

    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    pub fn with_key_token_len(mut self, len: usize) -> Self {
        self.key_token_len = len.max(1);
        self
    }

    /// Defaults overridden by `PREFIX__KEY` environment variables,
    /// e.g. `MART_ASSETS__AVATAR_MAX_BYTES=4194304`.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_vars(prefix, std::env::vars())
    }

    pub(crate) fn from_vars<I>(prefix: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(prefix) else {
                continue;
            };
            let invalid = || ConfigError::Invalid {
                key: key.clone(),
                value: value.clone(),
            };

            match stripped.to_lowercase().as_str() {
                "avatar_max_bytes" => {
                    config.avatar_max_bytes = value.parse().map_err(|_| invalid())?
                }
                "media_max_bytes" => {
                    config.media_max_bytes = value.parse().map_err(|_| invalid())?
                }
                "chunk_size" => match value.parse::<usize>() {
                    Ok(size) if size > 0 => config.chunk_size = size,
                    _ => return Err(invalid()),
                },
                "key_token_len" => match value.parse::<usize>() {
                    Ok(len) if len > 0 => config.key_token_len = len,
                    _ => return Err(invalid()),
                },
                _ => {}
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_match_endpoint_limits() {
        let config = AssetConfig::default();
        assert_eq!(config.avatar_max_bytes, 8_388_608);
        assert_eq!(config.media_max_bytes, 73_400_320);
        assert_eq!(config.chunk_size, 3_670_016);
        assert_eq!(config.key_token_len, 10);
    }

    #[test]
    fn env_overrides_known_keys_and_ignores_others() {
        let config = AssetConfig::from_vars(
            ENV_PREFIX,
            vars(&[
                ("MART_ASSETS__AVATAR_MAX_BYTES", "1024"),
                ("MART_ASSETS__KEY_TOKEN_LEN", "16"),
                ("MART_ASSETS__SOMETHING_ELSE", "x"),
                ("PATH", "/usr/bin"),
            ]),
        )
        .unwrap();

        assert_eq!(config.avatar_max_bytes, 1024);
        assert_eq!(config.key_token_len, 16);
        assert_eq!(config.media_max_bytes, AssetConfig::default().media_max_bytes);
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let err = AssetConfig::from_vars(ENV_PREFIX, vars(&[("MART_ASSETS__CHUNK_SIZE", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key, .. } if key == "MART_ASSETS__CHUNK_SIZE"
        ));

        let err =
            AssetConfig::from_vars(ENV_PREFIX, vars(&[("MART_ASSETS__MEDIA_MAX_BYTES", "lots")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
