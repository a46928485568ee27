//! Upload orchestration for event creation.
//!
//! Media payloads are normalised into an ordered sequence, then each one
//! is staged to a temporary file and pushed through the [`MediaStore`]
//! strictly one after another. The event record is only inserted once
//! every upload has succeeded, so a record never references a partial
//! set of media. URLs obtained before a failure are dropped without
//! being removed from the store.

use crate::entities::EventRecord;
use crate::entities::event_records::{EventFields, InsertEventRecord};
use crate::repository::EventRepository;
use crate::storage::{MediaStore, MediaStoreError};
use bytes::Bytes;
use evently_sdk::objects::OneOrMany;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Retry delay exponent cap (2^6 * base).
const MAX_RETRY_EXPONENT: u32 = 6;

static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInput {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Tunables for the upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    /// Directory that staged files are written to.
    pub temp_dir: PathBuf,
    /// Upper bound on a single store round trip.
    pub timeout: Duration,
    /// Extra attempts after a transient store failure or a timeout.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("evently-uploads"),
            timeout: Duration::from_secs(60),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no files were uploaded")]
    NoMedia,

    #[error("failed to stage {file_name}: {source}")]
    Stage {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upload of {file_name} failed: {source}")]
    Store {
        file_name: String,
        #[source]
        source: MediaStoreError,
    },

    #[error("upload of {file_name} timed out after {}s", .timeout.as_secs())]
    Timeout { file_name: String, timeout: Duration },

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// A file in the staging directory, removed when dropped.
///
/// Removal is best effort: failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Drop cannot await; a single unlink is cheap enough to run inline.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove staged file")
            }
        }
    }
}

/// Reduce a client-supplied name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_owned()
    } else {
        cleaned.to_owned()
    }
}

/// Staging file name: `{unix_millis}-{counter}-{name}`.
fn staged_file_name(original: &str) -> String {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let counter = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{millis}-{counter}-{}", sanitize_file_name(original))
}

/// Write `input` into `dir` under a unique name.
pub async fn stage(dir: &Path, input: &MediaInput) -> std::io::Result<StagedFile> {
    tokio::fs::create_dir_all(dir).await?;
    let staged = StagedFile {
        path: dir.join(staged_file_name(&input.file_name)),
    };
    // The guard exists before the write so a partial file is cleaned up too.
    tokio::fs::write(&staged.path, &input.bytes).await?;
    Ok(staged)
}

/// Delay before retry number `attempt` (0-based).
pub fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.pow(attempt.min(MAX_RETRY_EXPONENT)))
}

/// Uploads media and creates event records that reference it.
#[derive(Clone)]
pub struct UploadOrchestrator {
    store: Arc<dyn MediaStore>,
    repository: Arc<dyn EventRepository>,
    settings: UploadSettings,
}

impl UploadOrchestrator {
    pub fn new(
        store: Arc<dyn MediaStore>,
        repository: Arc<dyn EventRepository>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            store,
            repository,
            settings,
        }
    }

    /// Upload every media payload in order, then persist the event.
    ///
    /// No record is written unless all uploads succeed. The new record's
    /// `attendees` is always empty.
    pub async fn create_with_media(
        &self,
        fields: EventFields,
        media: OneOrMany<MediaInput>,
    ) -> Result<EventRecord, UploadError> {
        let inputs = media.into_vec();
        if inputs.is_empty() {
            return Err(UploadError::NoMedia);
        }

        let files = self.upload_all(inputs).await?;
        let record = self
            .repository
            .insert(InsertEventRecord { fields, files })
            .await?;

        info!(event_id = %record.id, files = record.files.len(), "Event created");
        Ok(record)
    }

    /// Upload sequentially; stops at the first failure.
    async fn upload_all(&self, inputs: Vec<MediaInput>) -> Result<Vec<String>, UploadError> {
        let mut urls = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let url = self.upload_one(&input).await.inspect_err(|e| {
                warn!(index, error = %e, "Media upload failed, abandoning event creation");
            })?;
            urls.push(url.to_string());
        }
        Ok(urls)
    }

    async fn upload_one(&self, input: &MediaInput) -> Result<url::Url, UploadError> {
        let staged = stage(&self.settings.temp_dir, input)
            .await
            .map_err(|source| UploadError::Stage {
                file_name: input.file_name.clone(),
                source,
            })?;

        let mut attempt = 0;
        loop {
            let outcome =
                tokio::time::timeout(self.settings.timeout, self.store.upload(staged.path())).await;
            let (error, transient) = match outcome {
                Ok(Ok(url)) => {
                    debug!(file_name = %input.file_name, %url, "Media uploaded");
                    return Ok(url);
                }
                Ok(Err(source)) => {
                    let transient = source.is_transient();
                    let error = UploadError::Store {
                        file_name: input.file_name.clone(),
                        source,
                    };
                    (error, transient)
                }
                // A timed out attempt is retried like any transient failure.
                Err(_) => {
                    let error = UploadError::Timeout {
                        file_name: input.file_name.clone(),
                        timeout: self.settings.timeout,
                    };
                    (error, true)
                }
            };

            if !transient || attempt >= self.settings.max_retries {
                return Err(error);
            }
            let delay = retry_delay(self.settings.retry_base_delay, attempt);
            warn!(
                file_name = %input.file_name,
                %error,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Transient upload failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
