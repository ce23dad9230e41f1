use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use crate::{BlobError, BlobResult, BlobStore, ConfigError, S3Config};

/// Blob store backed by an S3-compatible bucket (AWS, MinIO, RustFS)
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_read: bool,
}

impl S3BlobStore {
    /// Build a client from explicit settings
    pub async fn new(config: S3Config) -> Self {
        let client = Self::create_client(&config).await;
        Self {
            client,
            bucket: config.bucket,
            public_read: config.public_read,
        }
    }

    /// Build a client from `MART_S3_*` environment variables
    pub async fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(S3Config::from_env()?).await)
    }

    /// Wrap an already configured SDK client
    pub fn from_client<S: Into<String>>(client: Client, bucket: S, public_read: bool) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_read,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn create_client(config: &S3Config) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if !config.access_key_id.is_empty() {
            let credentials = Credentials::new(
                config.access_key_id.clone(),
                config.secret_access_key.clone(),
                None,
                None,
                "mart-s3",
            );
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(config.force_path_style)
                .build(),
        )
    }

    fn map_sdk_error<E, R>(&self, key: &str, err: SdkError<E, R>) -> BlobError
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        match BlobError::from_code(err.code(), key, &self.bucket, err.message()) {
            BlobError::Unknown { .. } => BlobError::unknown(DisplayErrorContext(&err).to_string()),
            classified => classified,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, key: &str, body: Bytes) -> BlobResult<()> {
        let size = body.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(AwsByteStream::from(body));

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request
            .send()
            .await
            .map_err(|err| self.map_sdk_error(key, err))?;

        debug!(bucket = %self.bucket, key, size, "uploaded object");
        Ok(())
    }

    /// One `DeleteObject` call. S3 answers 204 for absent keys, so unlike
    /// [`MemoryBlobStore`](crate::MemoryBlobStore) this never returns
    /// [`BlobError::NotFound`].
    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| self.map_sdk_error(key, err))?;

        debug!(bucket = %self.bucket, key, "deleted object");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
