use std::sync::Arc;

use configs::AppConfig;
use service::images::{CloudinaryImageStore, ImageStore, UploadPolicy};
use service::products::repo::MongoProductRepository;
use service::products::{ProductRepository, ProductService};

/// Everything a request handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct ServerState {
    pub products: ProductService,
    pub images: Arc<dyn ImageStore>,
    pub upload: UploadPolicy,
    pub max_body_bytes: usize,
}

impl ServerState {
    pub fn new(repo: Arc<dyn ProductRepository>, images: Arc<dyn ImageStore>, upload: UploadPolicy, max_body_bytes: usize) -> Self {
        Self { products: ProductService::new(repo), images, upload, max_body_bytes }
    }

    /// Production wiring: MongoDB for documents, Cloudinary for images.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let repo = MongoProductRepository::connect(&cfg.database).await?;
        let images = CloudinaryImageStore::new(cfg.image_store.clone(), cfg.upload.allowed_formats.clone());
        Ok(Self::new(
            Arc::new(repo),
            Arc::new(images),
            UploadPolicy::from_config(&cfg.upload),
            cfg.upload.max_body_bytes,
        ))
    }
}
