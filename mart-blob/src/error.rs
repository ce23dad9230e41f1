use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors surfaced by a [`BlobStore`](crate::BlobStore).
///
/// Backend-specific failures are folded into these four variants; anything
/// a backend cannot classify ends up in [`BlobError::Unknown`].
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {key}")]
    NotFound { key: String },

    #[error("Access denied for {key}: {message}")]
    AccessDenied { key: String, message: String },

    #[error("Bucket does not exist: {bucket}")]
    BucketMissing { bucket: String },

    #[error("Blob store error: {message}")]
    Unknown {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BlobError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an access denied error
    pub fn access_denied<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::AccessDenied {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a missing bucket error
    pub fn bucket_missing<S: Into<String>>(bucket: S) -> Self {
        Self::BucketMissing {
            bucket: bucket.into(),
        }
    }

    /// Create an unknown error without an underlying cause
    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::Unknown {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap any backend error as unknown
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unknown {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Classify an S3-style error code.
    ///
    /// Unrecognised or absent codes become [`BlobError::Unknown`].
    pub fn from_code(code: Option<&str>, key: &str, bucket: &str, message: Option<&str>) -> Self {
        let message = message.unwrap_or("no message from backend").to_string();
        match code {
            Some("NoSuchKey") | Some("NotFound") => Self::not_found(key),
            Some("AccessDenied")
            | Some("InvalidAccessKeyId")
            | Some("SignatureDoesNotMatch")
            | Some("AllAccessDisabled")
            | Some("AccountProblem") => Self::access_denied(key, message),
            Some("NoSuchBucket") => Self::bucket_missing(bucket),
            Some(other) => Self::unknown(format!("{other}: {message}")),
            None => Self::unknown(message),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
