use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::images::{ImageStore, ImageUpload};

/// Image store that keeps uploads in memory and mints URLs under `base_url`.
pub struct InMemoryImageStore {
    base_url: String,
    stored: RwLock<Vec<(String, ImageUpload)>>,
    fail_with: Option<String>,
}

impl InMemoryImageStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), stored: RwLock::new(Vec::new()), fail_with: None }
    }

    /// A store whose every upload fails with `message`, for exercising the error path.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { fail_with: Some(message.into()), ..Self::new("") }
    }

    /// URLs of everything stored so far, oldest first.
    pub async fn stored(&self) -> Vec<String> {
        self.stored.read().await.iter().map(|(url, _)| url.clone()).collect()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ServiceError> {
        if let Some(msg) = &self.fail_with {
            return Err(ServiceError::ImageStore(msg.clone()));
        }
        let mut stored = self.stored.write().await;
        let name = image.filename.clone().unwrap_or_else(|| format!("image.{}", image.format));
        let url = format!("{}/{}/{}-{}", self.base_url, folder, stored.len(), name);
        stored.push((url.clone(), image));
        Ok(url)
    }
}
