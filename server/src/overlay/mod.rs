//! Overlay records
//!
//! Handles storage and HTTP access for positioned text/image overlays.

mod local;
pub mod routes;
mod service;
mod types;

pub use local::SledOverlayStore;
pub use routes::{OverlayAppState, overlay_routes};
pub use service::OverlayStore;
pub use types::{Overlay, OverlayError, OverlayFields, OverlayId, StatusResponse};
