//! Shared application state and router assembly

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::overlay::{OverlayAppState, OverlayStore, overlay_routes};
use crate::upload::{UploadAppState, UploadService, upload_routes};

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OverlayStore>,
    pub uploads: Arc<UploadService>,
    pub max_upload_size: Option<usize>,
}

impl AppState {
    pub fn new(store: Arc<dyn OverlayStore>, uploads: Arc<UploadService>) -> Self {
        Self {
            store,
            uploads,
            max_upload_size: None,
        }
    }

    pub fn with_max_upload_size(mut self, limit: Option<usize>) -> Self {
        self.max_upload_size = limit;
        self
    }
}

/// Build the full HTTP router: overlay CRUD, uploads, permissive CORS and
/// request tracing
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let overlay_api = overlay_routes(OverlayAppState {
        store: state.store.clone(),
    });
    let uploads = upload_routes(UploadAppState {
        uploads: state.uploads.clone(),
        max_upload_size: state.max_upload_size,
    });

    Router::new()
        .nest("/api", overlay_api)
        .merge(uploads)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
