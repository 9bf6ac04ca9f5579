use crate::error::AppError;
use crate::services::sdk_error::sdk_error_message;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;

/// Object storage seen from the upload pipeline.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
        public_read: bool,
    ) -> Result<(), AppError>;

    async fn delete_object(&self, key: &str) -> Result<(), AppError>;

    /// URL of a public-read object. Not checked for reachability.
    fn public_url(&self, key: &str) -> String;
}

pub fn public_object_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
        public_read: bool,
    ) -> Result<(), AppError> {
        let size = data.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data));

        if public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(sdk_error_message(&e)))?;

        tracing::debug!(bucket = %self.bucket, key, size, "object stored");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(sdk_error_message(&e)))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.bucket, key)
    }
}
