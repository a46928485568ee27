//! Runtime configuration shared with request handlers.
//!
//! The sections that can change on SIGHUP live behind their own locks.

use evently_core::upload::UploadSettings;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Pagination limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    pub max_page_size: i64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self { max_page_size: 200 }
    }
}

/// Reloadable configuration, one lock per section.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    pub upload: Arc<RwLock<UploadSettings>>,
    pub pagination: Arc<RwLock<PaginationSettings>>,
}

impl SharedConfig {
    pub fn new(upload: UploadSettings, pagination: PaginationSettings) -> Self {
        Self {
            upload: Arc::new(RwLock::new(upload)),
            pagination: Arc::new(RwLock::new(pagination)),
        }
    }
}
