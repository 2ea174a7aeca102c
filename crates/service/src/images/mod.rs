//! Image storage: the store client seam and the policy applied to every
//! uploaded file before it reaches the store.

pub mod cloudinary;
pub mod memory;
pub mod policy;

use async_trait::async_trait;

use crate::errors::ServiceError;

pub use cloudinary::CloudinaryImageStore;
pub use memory::InMemoryImageStore;
pub use policy::{UploadPolicy, UploadSession};

/// One file accepted by the upload policy.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// Normalized format from the allow-list, e.g. `png`.
    pub format: String,
    pub bytes: Vec<u8>,
}

/// External service that keeps uploaded files and hands back a retrieval URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ServiceError>;
}
