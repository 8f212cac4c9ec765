//! HTTP route handlers for overlay API

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Serialize;
use std::sync::Arc;

use super::service::OverlayStore;
use super::types::{Overlay, OverlayError, OverlayFields, OverlayId, StatusResponse};

/// Application state containing the overlay store
#[derive(Clone)]
pub struct OverlayAppState {
    pub store: Arc<dyn OverlayStore>,
}

/// Error response for overlay API
#[derive(Debug, Serialize)]
pub struct OverlayErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<OverlayError> for OverlayErrorResponse {
    fn from(e: OverlayError) -> Self {
        let code = match &e {
            OverlayError::InvalidIdentifier(_) => "invalid_identifier",
            OverlayError::InvalidBody(_) => "invalid_body",
            OverlayError::Storage(_) => "storage_error",
            OverlayError::Encoding(_) => "encoding_error",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for OverlayErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "invalid_identifier" | "invalid_body" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn parse_id(raw: &str) -> Result<OverlayId, OverlayErrorResponse> {
    raw.parse().map_err(|e| {
        tracing::warn!("Rejected overlay identifier {:?}", raw);
        OverlayErrorResponse::from(e)
    })
}

fn parse_body(
    body: Result<Json<OverlayFields>, JsonRejection>,
) -> Result<OverlayFields, OverlayErrorResponse> {
    match body {
        Ok(Json(fields)) => Ok(fields),
        Err(rejection) => {
            tracing::warn!("Rejected overlay body: {}", rejection.body_text());
            Err(OverlayErrorResponse::from(OverlayError::InvalidBody(
                rejection.body_text(),
            )))
        }
    }
}

/// POST /api/overlays - Create an overlay
pub async fn create_overlay(
    State(state): State<OverlayAppState>,
    body: Result<Json<OverlayFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Overlay>), OverlayErrorResponse> {
    let fields = parse_body(body)?;
    let overlay = state.store.create(fields).await.map_err(|e| {
        tracing::error!("Failed to create overlay: {}", e);
        OverlayErrorResponse::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(overlay)))
}

/// GET /api/overlays - List all overlays
pub async fn list_overlays(
    State(state): State<OverlayAppState>,
) -> Result<Json<Vec<Overlay>>, OverlayErrorResponse> {
    let overlays = state.store.list().await.map_err(|e| {
        tracing::error!("Failed to list overlays: {}", e);
        OverlayErrorResponse::from(e)
    })?;

    Ok(Json(overlays))
}

/// PUT /api/overlays/:id - Update allowed fields of an overlay
///
/// Succeeds even when no overlay has this id.
pub async fn update_overlay(
    State(state): State<OverlayAppState>,
    Path(id): Path<String>,
    body: Result<Json<OverlayFields>, JsonRejection>,
) -> Result<Json<StatusResponse>, OverlayErrorResponse> {
    let id = parse_id(&id)?;
    let patch = parse_body(body)?;

    let matched = state.store.update(id, &patch).await.map_err(|e| {
        tracing::error!("Failed to update overlay {}: {}", id, e);
        OverlayErrorResponse::from(e)
    })?;
    if !matched {
        tracing::debug!("Update matched no overlay for id {}", id);
    }

    Ok(Json(StatusResponse::updated()))
}

/// DELETE /api/overlays/:id - Delete an overlay
///
/// Succeeds even when no overlay has this id.
pub async fn delete_overlay(
    State(state): State<OverlayAppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, OverlayErrorResponse> {
    let id = parse_id(&id)?;

    let removed = state.store.delete(id).await.map_err(|e| {
        tracing::error!("Failed to delete overlay {}: {}", id, e);
        OverlayErrorResponse::from(e)
    })?;
    if !removed {
        tracing::debug!("Delete matched no overlay for id {}", id);
    }

    Ok(Json(StatusResponse::deleted()))
}

/// Build overlay API routes
pub fn overlay_routes(state: OverlayAppState) -> Router {
    Router::new()
        .route("/overlays", get(list_overlays).post(create_overlay))
        .route("/overlays/:id", put(update_overlay).delete(delete_overlay))
        .with_state(state)
}
