use std::env;

use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable required")]
    Missing(String),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Connection settings for an S3-compatible bucket
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,

    /// Custom endpoint (MinIO, RustFS, ...). `None` talks to AWS.
    pub endpoint_url: Option<String>,

    pub access_key_id: String,
    pub secret_access_key: String,

    /// Address objects as `endpoint/bucket/key` rather than `bucket.endpoint/key`
    pub force_path_style: bool,

    /// Upload with the `public-read` canned ACL
    pub public_read: bool,
}

impl S3Config {
    pub fn new<B: Into<String>, R: Into<String>>(bucket: B, region: R) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint_url: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            force_path_style: true,
            public_read: true,
        }
    }

    /// Set a custom endpoint
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint_url: S) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set static credentials
    pub fn with_credentials<A: Into<String>, S: Into<String>>(
        mut self,
        access_key_id: A,
        secret_access_key: S,
    ) -> Self {
        self.access_key_id = access_key_id.into();
        self.secret_access_key = secret_access_key.into();
        self
    }

    pub fn with_force_path_style(mut self, enabled: bool) -> Self {
        self.force_path_style = enabled;
        self
    }

    pub fn with_public_read(mut self, enabled: bool) -> Self {
        self.public_read = enabled;
        self
    }

    /// Load from `MART_S3_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()));
        let flag = |key: &str, default: bool| match lookup(key) {
            None => Ok(default),
            Some(value) => value.parse::<bool>().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value,
            }),
        };

        Ok(Self {
            bucket: required("MART_S3_BUCKET")?,
            region: required("MART_S3_REGION")?,
            endpoint_url: lookup("MART_S3_ENDPOINT_URL").filter(|url| !url.is_empty()),
            access_key_id: required("MART_S3_ACCESS_KEY_ID")?,
            secret_access_key: required("MART_S3_SECRET_ACCESS_KEY")?,
            force_path_style: flag("MART_S3_FORCE_PATH_STYLE", true)?,
            public_read: flag("MART_S3_PUBLIC_READ", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("MART_S3_BUCKET", "assets"),
        ("MART_S3_REGION", "us-east-1"),
        ("MART_S3_ACCESS_KEY_ID", "minio"),
        ("MART_S3_SECRET_ACCESS_KEY", "minio123"),
    ];

    #[test]
    fn loads_required_and_defaults() {
        let config = S3Config::from_lookup(lookup_from(BASE)).unwrap();
        assert_eq!(config.bucket, "assets");
        assert_eq!(config.endpoint_url, None);
        assert!(config.force_path_style);
        assert!(config.public_read);
    }

    #[test]
    fn reads_optional_values() {
        let mut pairs = BASE.to_vec();
        pairs.push(("MART_S3_ENDPOINT_URL", "http://localhost:9000"));
        pairs.push(("MART_S3_PUBLIC_READ", "false"));
        let config = S3Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(!config.public_read);
    }

    #[test]
    fn missing_bucket_is_reported() {
        let err = S3Config::from_lookup(lookup_from(&BASE[1..])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("MART_S3_BUCKET".to_string()));
    }

    #[test]
    fn invalid_flag_is_reported() {
        let mut pairs = BASE.to_vec();
        pairs.push(("MART_S3_FORCE_PATH_STYLE", "sometimes"));
        let err = S3Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key, .. } if key == "MART_S3_FORCE_PATH_STYLE"
        ));
    }
}
