//! Remote object store for uploaded media.

mod cloudinary;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Errors returned by a [`MediaStore`].
#[derive(Debug, Error)]
pub enum MediaStoreError {
    /// The local file could not be read.
    #[error("failed to read local file: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error.
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with an error.
    #[error("object store rejected the upload with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The store answered with something we could not interpret.
    #[error("invalid object store response: {0}")]
    InvalidResponse(String),
}

impl MediaStoreError {
    /// Whether retrying the same upload may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MediaStoreError::Request(e) => e.is_timeout() || e.is_connect(),
            MediaStoreError::Rejected { status, .. } => *status >= 500 || *status == 429,
            MediaStoreError::Io(_) | MediaStoreError::InvalidResponse(_) => false,
        }
    }
}

/// Uploads a local file and returns its permanent retrieval URL.
///
/// Implementations never delete the local file; the caller owns it.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, local_path: &Path) -> Result<Url, MediaStoreError>;
}
