//! OverlayStore trait definition

use async_trait::async_trait;

use super::types::{Overlay, OverlayError, OverlayFields, OverlayId};

/// Trait for overlay document stores
#[async_trait]
pub trait OverlayStore: Send + Sync {
    /// Persist a new overlay built from `fields` and return the full record
    async fn create(&self, fields: OverlayFields) -> Result<Overlay, OverlayError>;

    /// All overlays in store order
    async fn list(&self) -> Result<Vec<Overlay>, OverlayError>;

    /// Apply `patch` to an existing overlay.
    ///
    /// Returns whether a record matched. A missing record is not an error.
    async fn update(&self, id: OverlayId, patch: &OverlayFields) -> Result<bool, OverlayError>;

    /// Remove an overlay. Returns whether a record was removed.
    async fn delete(&self, id: OverlayId) -> Result<bool, OverlayError>;
}
