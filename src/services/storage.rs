//! Object storage service (S3-compatible)

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
#[cfg(test)]
use mockall::automock;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

/// Upload-by-path object store with public URL retrieval
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes at a key, replacing any previous object at the same key
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()>;

    /// Public URL for a key
    fn public_url(&self, key: &str) -> String;
}

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    config: StorageConfig,
}

impl S3ObjectStore {
    /// Create a new S3 client from the storage configuration.
    /// Credentials come from the standard AWS provider chain.
    pub async fn new(config: StorageConfig) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            config,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                AppError::Storage(format!("upload {}: {}", key, DisplayErrorContext(&e)))
            })?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match self.config.public_url {
            Some(ref base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.config.bucket, self.config.region, key
            ),
        }
    }
}
