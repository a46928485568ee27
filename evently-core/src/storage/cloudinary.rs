//! Cloudinary upload client.
//!
//! Uses the signed upload endpoint: every request carries the API key,
//! a timestamp and a SHA-1 signature over the sorted signable parameters
//! followed by the API secret.

use super::{MediaStore, MediaStoreError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Connection settings for a Cloudinary account.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Optional folder uploaded assets are placed in.
    pub folder: Option<String>,
    pub base_url: Url,
}

pub struct CloudinaryStore {
    config: CloudinaryConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<Url>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn endpoint(&self) -> Result<Url, MediaStoreError> {
        self.config
            .base_url
            .join(&format!("v1_1/{}/auto/upload", self.config.cloud_name))
            .map_err(|e| MediaStoreError::InvalidResponse(format!("bad upload endpoint: {e}")))
    }

    fn signable_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("timestamp", timestamp.to_string())];
        if let Some(folder) = &self.config.folder {
            params.push(("folder", folder.clone()));
        }
        params.sort_by(|a, b| a.0.cmp(b.0));
        params
    }
}

/// `k1=v1&k2=v2...` for already sorted parameters.
fn string_to_sign(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let payload = format!("{}{}", string_to_sign(params), api_secret);
    let digest = ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, payload.as_bytes());
    digest.as_ref().iter().map(|b| format!("{b:02x}")).collect()
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    #[tracing::instrument(skip(self), err)]
    async fn upload(&self, local_path: &Path) -> Result<Url, MediaStoreError> {
        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_owned());

        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
        let params = self.signable_params(timestamp);
        let signature = sign(&params, &self.config.api_secret);

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .http_client
            .post(self.endpoint()?)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: UploadResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(MediaStoreError::Rejected {
                    status: status.as_u16(),
                    message: body,
                });
            }
            Err(e) => return Err(MediaStoreError::InvalidResponse(e.to_string())),
        };

        if !status.is_success() {
            return Err(MediaStoreError::Rejected {
                status: status.as_u16(),
                message: parsed
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| status.to_string()),
            });
        }

        parsed
            .secure_url
            .ok_or_else(|| MediaStoreError::InvalidResponse("missing secure_url".to_owned()))
    }
}
