use std::sync::Arc;

use tracing::{debug, warn};

use configs::UploadConfig;

use crate::errors::ServiceError;
use crate::images::{ImageStore, ImageUpload};

/// Rules for the files of one create request: a single accepted field name,
/// a target folder, a file-count cap, and a format allow-list.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub field_name: String,
    pub folder: String,
    pub max_files: usize,
    pub allowed_formats: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self { Self::from_config(&UploadConfig::default()) }
}

impl UploadPolicy {
    pub fn from_config(cfg: &UploadConfig) -> Self {
        Self {
            field_name: cfg.field_name.clone(),
            folder: cfg.folder.clone(),
            max_files: cfg.max_files,
            allowed_formats: cfg.allowed_formats.clone(),
        }
    }

    /// Resolve the format of a file from its extension, falling back to the
    /// declared content type, and check it against the allow-list.
    pub fn detect_format(&self, filename: Option<&str>, content_type: Option<&str>) -> Result<String, ServiceError> {
        let from_name = filename
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty());
        let from_type = content_type
            .and_then(|ct| ct.split(';').next())
            .and_then(|ct| ct.trim().strip_prefix("image/"))
            .map(str::to_ascii_lowercase);
        let format = from_name.or(from_type).unwrap_or_default();
        if self.allowed_formats.iter().any(|f| *f == format) {
            return Ok(format);
        }
        Err(ServiceError::UnsupportedFormat {
            filename: filename.unwrap_or_default().to_string(),
            format,
            allowed: self.allowed_formats.join(","),
        })
    }

    pub fn start(&self, store: Arc<dyn ImageStore>) -> UploadSession {
        UploadSession { policy: self.clone(), store, urls: Vec::new() }
    }
}

/// Files of one request, uploaded one at a time in arrival order.
///
/// A rejected file fails the whole request, but files uploaded before it are
/// already stored and are not removed.
pub struct UploadSession {
    policy: UploadPolicy,
    store: Arc<dyn ImageStore>,
    urls: Vec<String>,
}

impl UploadSession {
    pub async fn accept(
        &mut self,
        field: &str,
        filename: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<(), ServiceError> {
        if field != self.policy.field_name {
            warn!(%field, "file under unexpected field");
            return Err(ServiceError::UnexpectedField(field.to_string()));
        }
        if self.urls.len() >= self.policy.max_files {
            warn!(max = self.policy.max_files, uploaded = self.urls.len(), "file count cap exceeded");
            return Err(ServiceError::TooManyFiles { max: self.policy.max_files });
        }
        let format = self.policy.detect_format(filename.as_deref(), content_type.as_deref())?;
        let image = ImageUpload { filename, content_type, format, bytes };
        let url = self.store.upload(&self.policy.folder, image).await?;
        debug!(%url, position = self.urls.len(), "image stored");
        self.urls.push(url);
        Ok(())
    }

    pub fn uploaded(&self) -> &[String] { &self.urls }

    pub fn finish(self) -> Vec<String> { self.urls }
}
