//! Overlay store backed by an embedded sled database

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::service::OverlayStore;
use super::types::{Overlay, OverlayError, OverlayFields, OverlayId, now_timestamp};

/// Name of the sled tree holding overlay documents
const COLLECTION: &str = "overlays";

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

fn encode<T: Serialize>(item: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(item)
}

/// Overlay documents stored as JSON in a sled tree keyed by raw id bytes
#[derive(Clone)]
pub struct SledOverlayStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledOverlayStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self, OverlayError> {
        let db = sled::Config::new().path(path).open()?;
        info!("Opened overlay store at {:?}", path);
        Self::with_db(db)
    }

    /// Open a throwaway database that is removed on drop
    pub fn temporary() -> Result<Self, OverlayError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_db(db)
    }

    fn with_db(db: sled::Db) -> Result<Self, OverlayError> {
        let tree = db.open_tree(COLLECTION)?;
        Ok(Self { db, tree })
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<usize, OverlayError> {
        Ok(self.db.flush_async().await?)
    }

    /// Number of stored overlays
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

/// Decode a stored document, apply the patch and re-encode it
fn patched(bytes: &[u8], patch: &OverlayFields) -> Result<Vec<u8>, serde_json::Error> {
    let mut overlay: Overlay = decode(bytes)?;
    overlay.apply(patch);
    encode(&overlay)
}

#[async_trait]
impl OverlayStore for SledOverlayStore {
    async fn create(&self, fields: OverlayFields) -> Result<Overlay, OverlayError> {
        let overlay = Overlay::new(OverlayId::new(), fields, now_timestamp());
        self.tree.insert(overlay.id.as_bytes(), encode(&overlay)?)?;
        debug!("Created overlay {}", overlay.id);
        Ok(overlay)
    }

    async fn list(&self) -> Result<Vec<Overlay>, OverlayError> {
        let mut overlays = Vec::new();
        for entry in self.tree.iter() {
            let (key, value) = entry?;
            match decode::<Overlay>(&value) {
                Ok(overlay) => overlays.push(overlay),
                Err(e) => {
                    warn!("Skipping undecodable overlay document {:?}: {}", key, e);
                }
            }
        }
        Ok(overlays)
    }

    async fn update(&self, id: OverlayId, patch: &OverlayFields) -> Result<bool, OverlayError> {
        if patch.is_empty() {
            return Ok(self.tree.contains_key(id.as_bytes())?);
        }

        // The closure may run more than once under contention; only the last
        // attempt's failure counts.
        let mut failure = None;
        let previous = self.tree.fetch_and_update(id.as_bytes(), |current| {
            failure = None;
            let bytes = current?;
            match patched(bytes, patch) {
                Ok(updated) => Some(updated),
                Err(e) => {
                    failure = Some(e);
                    Some(bytes.to_vec())
                }
            }
        })?;

        if let Some(e) = failure {
            return Err(e.into());
        }

        let matched = previous.is_some();
        debug!("Updated overlay {} (matched: {})", id, matched);
        Ok(matched)
    }

    async fn delete(&self, id: OverlayId) -> Result<bool, OverlayError> {
        let removed = self.tree.remove(id.as_bytes())?.is_some();
        debug!("Deleted overlay {} (removed: {})", id, removed);
        Ok(removed)
    }
}
