//! Application state shared across all request handlers.

use crate::config::runtime::SharedConfig;
use evently_core::repository::EventRepository;
use evently_core::storage::MediaStore;
use evently_core::upload::UploadOrchestrator;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Event persistence backend.
    pub repository: Arc<dyn EventRepository>,
    /// Remote store uploaded media is pushed to.
    pub media_store: Arc<dyn MediaStore>,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn EventRepository>,
        media_store: Arc<dyn MediaStore>,
        config: SharedConfig,
    ) -> Self {
        Self {
            repository,
            media_store,
            config,
        }
    }

    /// An upload orchestrator using the current upload settings.
    pub async fn orchestrator(&self) -> UploadOrchestrator {
        let settings = self.config.upload.read().await.clone();
        UploadOrchestrator::new(self.media_store.clone(), self.repository.clone(), settings)
    }
}
