//! Remote media host abstraction.

use async_trait::async_trait;

use crate::{
    asset::{DeletionResult, UploadRequest, UploadResponse},
    error::HostError,
};

/// A service that stores images and hands back permanent URLs.
///
/// Implementations perform exactly one request per call: no retries, no
/// local existence checks. Timeouts belong to the underlying HTTP client.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Host identifier (e.g., "cloudinary").
    fn id(&self) -> &'static str;

    /// Store an image and return the host's raw acknowledgement.
    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, HostError>;

    /// Remove an asset by public id. "Not found" is a normal result, not an error.
    async fn destroy(&self, public_id: &str) -> Result<DeletionResult, HostError>;
}
