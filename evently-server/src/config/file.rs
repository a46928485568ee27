//! TOML file configuration structures.
//!
//! These structs directly map to the `evently-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    pub object_store: ObjectStoreConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:5000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Maximum request body size, which bounds the total size of uploaded media.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

/// Upload pipeline section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Staging directory. Defaults to `<system temp>/evently-uploads`.
    pub temp_dir: Option<PathBuf>,
    /// Per-file bound on one object store round trip.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transient object store failure.
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

/// Pagination section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Larger `limit` values are clamped to this.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_max_page_size() -> i64 {
    200
}

/// Cloudinary account used for media uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub cloud_name: String,
    pub api_key: String,
    /// May be left empty and supplied through `EVENTLY_OBJECT_STORE_SECRET`.
    #[serde(default)]
    pub api_secret: String,
    pub folder: Option<String>,
    /// API root; must end with a slash if it carries a path.
    #[serde(default = "default_object_store_url")]
    pub base_url: url::Url,
}

fn default_object_store_url() -> url::Url {
    url::Url::parse("https://api.cloudinary.com/").expect("valid default URL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[upload]
temp_dir = "/var/tmp/evently"
max_retries = 2

[pagination]
max_page_size = 50

[object_store]
cloud_name = "demo"
api_key = "123456"
api_secret = "shh"
folder = "events"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.server.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.upload.temp_dir, Some(PathBuf::from("/var/tmp/evently")));
        assert_eq!(config.upload.timeout_secs, 60);
        assert_eq!(config.upload.max_retries, 2);
        assert_eq!(config.pagination.max_page_size, 50);
        assert_eq!(config.object_store.folder.as_deref(), Some("events"));
        assert_eq!(
            config.object_store.base_url.as_str(),
            "https://api.cloudinary.com/"
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_str = r#"
[object_store]
cloud_name = "demo"
api_key = "123456"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 5000);
        assert_eq!(config.pagination.max_page_size, 200);
        assert!(config.upload.temp_dir.is_none());
        assert!(config.object_store.api_secret.is_empty());
    }
}
