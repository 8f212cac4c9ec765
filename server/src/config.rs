//! Server configuration
//!
//! Configuration is loaded from environment variables layered over defaults.

use std::env;
use std::path::{Path, PathBuf};

/// Scheme prefix accepted (and ignored) on `DATABASE_URL`
const SLED_SCHEME: &str = "sled://";

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Externally visible base URL used to build upload links (optional)
    pub public_base_url: Option<String>,

    /// Document store configuration
    pub storage: StorageConfig,

    /// Upload configuration
    pub upload: UploadConfig,
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Database location, either a bare path or `sled://<path>`
    pub database_url: String,
}

/// Upload-related configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploaded files are written to and served from
    pub uploads_dir: PathBuf,
    /// Maximum request body size for uploads in bytes (`None` = unlimited)
    pub max_upload_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            public_base_url: None,
            storage: StorageConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "./data/overlays".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("./uploads"),
            max_upload_size: None,
        }
    }
}

impl StorageConfig {
    /// Filesystem path of the database, with any `sled://` prefix removed
    pub fn database_path(&self) -> &Path {
        Path::new(
            self.database_url
                .strip_prefix(SLED_SCHEME)
                .unwrap_or(&self.database_url),
        )
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Server config
        if let Ok(host) = env::var("HOST")
            && !host.is_empty()
        {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }
        if let Ok(url) = env::var("PUBLIC_BASE_URL")
            && !url.is_empty()
        {
            config.public_base_url = Some(url);
        }

        // Storage config
        if let Ok(url) = env::var("DATABASE_URL")
            && !url.is_empty()
        {
            config.storage.database_url = url;
        }

        // Upload config
        if let Ok(dir) = env::var("UPLOADS_DIR")
            && !dir.is_empty()
        {
            config.upload.uploads_dir = PathBuf::from(dir);
        }
        if let Ok(val) = env::var("UPLOAD_MAX_SIZE_MB")
            && let Some(limit) = parse_megabytes(&val)
        {
            config.upload.max_upload_size = Some(limit);
        }

        config
    }

    /// Base URL clients reach this server on, without a trailing slash.
    ///
    /// Falls back to the bind address when `PUBLIC_BASE_URL` is not set.
    pub fn public_base_url(&self) -> String {
        match self.public_base_url {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// Megabyte count to bytes; `None` if unparseable or out of range
fn parse_megabytes(val: &str) -> Option<usize> {
    val.trim().parse::<usize>().ok()?.checked_mul(1024 * 1024)
}
