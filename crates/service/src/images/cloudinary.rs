use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{error, info, instrument};

use configs::{ImageStoreConfig, SignatureAlgorithm};

use crate::errors::ServiceError;
use crate::images::{ImageStore, ImageUpload};

/// Signed uploads to the Cloudinary image API.
///
/// The account's own allow-list check runs on the service side as well, so a
/// file that slips past the local extension check is still refused there.
#[derive(Clone)]
pub struct CloudinaryImageStore {
    http: reqwest::Client,
    cfg: ImageStoreConfig,
    allowed_formats: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl CloudinaryImageStore {
    pub fn new(cfg: ImageStoreConfig, allowed_formats: Vec<String>) -> Self {
        Self::with_client(reqwest::Client::new(), cfg, allowed_formats)
    }

    pub fn with_client(http: reqwest::Client, cfg: ImageStoreConfig, allowed_formats: Vec<String>) -> Self {
        Self { http, cfg, allowed_formats }
    }

    fn signed_params(&self, folder: &str, timestamp: u64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("allowed_formats", self.allowed_formats.join(","));
        params.insert("folder", folder.to_string());
        params.insert("timestamp", timestamp.to_string());
        params
    }
}

/// Request signature: parameters sorted by name, joined as `k=v&k=v`, with the
/// API secret appended, then hex-digested.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str, algorithm: &SignatureAlgorithm) -> String {
    let mut payload = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    payload.push_str(api_secret);
    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    #[instrument(skip(self, image), fields(cloud = %self.cfg.cloud_name, format = %image.format, size = image.bytes.len()))]
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ServiceError> {
        let params = self.signed_params(folder, unix_now());
        let signature = sign(&params, &self.cfg.api_secret, &self.cfg.signature_algorithm);

        let file_name = image.filename.clone().unwrap_or_else(|| format!("upload.{}", image.format));
        let mut form = Form::new().part("file", Part::bytes(image.bytes).file_name(file_name));
        for (k, v) in params {
            form = form.text(k, v);
        }
        form = form
            .text("api_key", self.cfg.api_key.clone())
            .text("signature", signature);

        let resp = self
            .http
            .post(self.cfg.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::ImageStore(e.to_string()))?;
        let status = resp.status();
        let body: UploadResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::ImageStore(format!("unreadable upload response ({status}): {e}")))?;

        if let Some(err) = body.error {
            error!(%status, message = %err.message, "image upload refused");
            return Err(ServiceError::ImageStore(err.message));
        }
        if !status.is_success() {
            return Err(ServiceError::ImageStore(format!("upload failed with status {status}")));
        }
        let url = body
            .secure_url
            .ok_or_else(|| ServiceError::ImageStore("upload response has no secure_url".into()))?;
        info!(%url, "image uploaded");
        Ok(url)
    }
}
