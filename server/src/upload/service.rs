//! Disk-backed storage for uploaded files

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::UploadConfig;

use super::filename::{is_safe_filename, sanitize_filename};
use super::types::{StoredUpload, UploadError};

/// Route prefix files are served under
pub const SERVE_PREFIX: &str = "/uploads";

/// Writes uploads into a single directory and resolves them for serving.
///
/// Same-named uploads overwrite each other; the last write wins.
pub struct UploadService {
    uploads_dir: PathBuf,
    public_base_url: String,
}

impl UploadService {
    /// Create a new upload service, creating the directory if needed
    pub fn new(config: &UploadConfig, public_base_url: &str) -> Result<Self, UploadError> {
        let uploads_dir = config.uploads_dir.clone();

        if !uploads_dir.exists() {
            std::fs::create_dir_all(&uploads_dir)?;
            info!("Created uploads directory: {:?}", uploads_dir);
        } else if !uploads_dir.is_dir() {
            return Err(UploadError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Uploads path is not a directory: {:?}", uploads_dir),
            )));
        }

        Ok(Self {
            uploads_dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Public URL of the serve endpoint for an already-sanitized filename
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}{}/{}", self.public_base_url, SERVE_PREFIX, filename)
    }

    /// Store `data` under the sanitized form of `original_name`
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredUpload, UploadError> {
        let filename = sanitize_filename(original_name).ok_or_else(UploadError::no_selected_file)?;

        // The directory may have been removed since startup
        tokio::fs::create_dir_all(&self.uploads_dir).await?;

        let path = self.uploads_dir.join(&filename);
        tokio::fs::write(&path, data).await?;

        info!(
            "Stored upload {:?} as {:?} ({} bytes)",
            original_name,
            filename,
            data.len()
        );

        Ok(StoredUpload {
            url: self.url_for(&filename),
            filename,
        })
    }

    /// Path of a stored upload, or an error if the name is unsafe or missing
    pub async fn resolve(&self, requested: &str) -> Result<PathBuf, UploadError> {
        if !is_safe_filename(requested) {
            return Err(UploadError::InvalidPath(requested.to_string()));
        }

        let path = self.uploads_dir.join(requested);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(UploadError::NotFound(requested.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Upload not found: {:?}", path);
                Err(UploadError::NotFound(requested.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
