//! Overlay Server Library
//!
//! This module exports the server components for use in integration tests
//! and the binary.

pub mod config;
pub mod overlay;
pub mod server;
pub mod upload;

// Re-export commonly used types
pub use overlay::{Overlay, OverlayStore, SledOverlayStore, overlay_routes};
pub use server::{AppState, router};
pub use upload::{UploadService, upload_routes};
