//! Upload-related types and error definitions

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when storing or serving uploads
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    MissingFile(&'static str),

    #[error("Invalid upload path: {0}")]
    InvalidPath(String),

    #[error("Upload not found: {0}")]
    NotFound(String),

    #[error("Upload exceeds size limit")]
    PayloadTooLarge,

    #[error("Invalid multipart request: {0}")]
    Multipart(MultipartError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl UploadError {
    pub fn no_file_part() -> Self {
        Self::MissingFile("No file part")
    }

    pub fn no_selected_file() -> Self {
        Self::MissingFile("No selected file")
    }
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::Multipart(e)
        }
    }
}

/// A file written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Sanitized name the file was stored under
    pub filename: String,
    /// Absolute URL of the serve endpoint for this file
    pub url: String,
}

/// Response for POST /api/upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
