use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::Object;
use aws_sdk_s3::Client as S3Client;

use crate::store::{BlobStore, StoreError};

/// Artifact cache backed by an S3 bucket
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    /// List with the key as prefix and look for an exact match
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("S3 list_objects_v2 failed for prefix {}: {}", key, e);
                StoreError::Lookup {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
            })?;

        Ok(contains_key(resp.contents(), key))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StoreError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

/// A prefix listing also returns longer keys, so only an exact match counts
fn contains_key(objects: &[Object], key: &str) -> bool {
    objects.iter().any(|object| object.key() == Some(key))
}
