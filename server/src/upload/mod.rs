//! Image uploads
//!
//! This module provides:
//! - `sanitize_filename` for turning client filenames into safe storage keys
//! - `UploadService` for writing uploads to disk and resolving them again
//! - HTTP routes for uploading (`POST /api/upload`) and serving
//!   (`GET /uploads/:filename`)

mod filename;
pub mod routes;
mod service;
mod types;

pub use filename::{is_safe_filename, sanitize_filename};
pub use routes::{FILE_FIELD, UploadAppState, upload_routes};
pub use service::{SERVE_PREFIX, UploadService};
pub use types::{StoredUpload, UploadError, UploadResponse};
