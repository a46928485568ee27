//! Configuration module for evently-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::{FileConfig, ObjectStoreConfig, PaginationConfig, UploadConfig};
use crate::config::runtime::{PaginationSettings, SharedConfig};
use evently_core::storage::CloudinaryConfig;
use evently_core::upload::UploadSettings;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `object_store.api_secret`.
pub const OBJECT_STORE_SECRET_ENV: &str = "EVENTLY_OBJECT_STORE_SECRET";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Server-level settings that are fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen: SocketAddr,
    pub max_upload_bytes: usize,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerSettings,
    pub object_store: CloudinaryConfig,
    pub upload: UploadSettings,
    pub pagination: PaginationSettings,
}

impl LoadedConfig {
    /// Split off the reloadable sections.
    pub fn shared(&self) -> SharedConfig {
        SharedConfig::new(self.upload.clone(), self.pagination)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        let secret_override = std::env::var(OBJECT_STORE_SECRET_ENV).ok();
        self.process(file_config, secret_override)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn process(
        &self,
        mut file_config: FileConfig,
        secret_override: Option<String>,
    ) -> Result<LoadedConfig, ConfigError> {
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let Some(secret) = secret_override.filter(|s| !s.is_empty()) {
            file_config.object_store.api_secret = secret;
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            server: ServerSettings {
                listen: file_config.server.listen,
                max_upload_bytes: file_config.server.max_upload_bytes,
            },
            object_store: convert_object_store(file_config.object_store),
            upload: convert_upload(file_config.upload),
            pagination: convert_pagination(file_config.pagination),
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let store = &config.object_store;
    for (name, value) in [
        ("cloud_name", &store.cloud_name),
        ("api_key", &store.api_key),
        ("api_secret", &store.api_secret),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "object_store.{name} must not be empty"
            )));
        }
    }
    if config.pagination.max_page_size < 1 {
        return Err(ConfigError::ValidationError(
            "pagination.max_page_size must be positive".to_string(),
        ));
    }
    if config.upload.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "upload.timeout_secs must be positive".to_string(),
        ));
    }
    Ok(())
}

fn convert_object_store(c: ObjectStoreConfig) -> CloudinaryConfig {
    CloudinaryConfig {
        cloud_name: c.cloud_name,
        api_key: c.api_key,
        api_secret: c.api_secret,
        folder: c.folder,
        base_url: c.base_url,
    }
}

fn convert_upload(c: UploadConfig) -> UploadSettings {
    let defaults = UploadSettings::default();
    UploadSettings {
        temp_dir: c.temp_dir.unwrap_or(defaults.temp_dir),
        timeout: Duration::from_secs(c.timeout_secs),
        max_retries: c.max_retries,
        retry_base_delay: Duration::from_millis(c.retry_base_delay_ms),
    }
}

fn convert_pagination(c: PaginationConfig) -> PaginationSettings {
    PaginationSettings {
        max_page_size: c.max_page_size,
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    const BASE: &str = r#"
[upload]
timeout_secs = 15
retry_base_delay_ms = 250

[object_store]
cloud_name = "demo"
api_key = "123456"
api_secret = "from-file"
"#;

    #[test]
    fn test_overrides_are_applied() {
        let listen: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let loader = ConfigLoader::new("unused.toml", Some(listen));
        let loaded = loader
            .process(parse(BASE), Some("from-env".to_string()))
            .unwrap();

        assert_eq!(loaded.server.listen, listen);
        assert_eq!(loaded.object_store.api_secret, "from-env");
        assert_eq!(loaded.upload.timeout, Duration::from_secs(15));
        assert_eq!(loaded.upload.retry_base_delay, Duration::from_millis(250));
        assert_eq!(loaded.pagination.max_page_size, 200);
    }

    #[test]
    fn test_empty_env_secret_is_ignored() {
        let loader = ConfigLoader::new("unused.toml", None);
        let loaded = loader.process(parse(BASE), Some(String::new())).unwrap();
        assert_eq!(loaded.object_store.api_secret, "from-file");
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let config = parse(
            r#"
[object_store]
cloud_name = "demo"
api_key = "123456"
"#,
        );
        let loader = ConfigLoader::new("unused.toml", None);
        assert!(matches!(
            loader.process(config, None),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_non_positive_page_size_is_rejected() {
        let mut config = parse(BASE);
        config.pagination.max_page_size = 0;
        let loader = ConfigLoader::new("unused.toml", None);
        assert!(matches!(
            loader.process(config, None),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
