use crate::shared::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Remote binary storage keyed by path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads the content under `path` and returns a durable retrieval URL.
    async fn upload(&self, path: &str, content: Bytes) -> Result<String>;

    /// Deletes the object a previously returned URL points at.
    async fn delete(&self, url: &str) -> Result<()>;
}
