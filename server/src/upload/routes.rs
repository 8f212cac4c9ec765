//! HTTP route handlers for uploading and serving files

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Request, State, multipart::MultipartRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::service::UploadService;
use super::types::{UploadError, UploadResponse};

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Application state containing the upload service
#[derive(Clone)]
pub struct UploadAppState {
    pub uploads: Arc<UploadService>,
    /// Request body cap for uploads (`None` = unlimited)
    pub max_upload_size: Option<usize>,
}

/// Error response for upload API
#[derive(Debug, Serialize)]
pub struct UploadErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<UploadError> for UploadErrorResponse {
    fn from(e: UploadError) -> Self {
        let code = match &e {
            UploadError::MissingFile(_) => "missing_file",
            UploadError::InvalidPath(_) => "invalid_path",
            UploadError::NotFound(_) => "not_found",
            UploadError::PayloadTooLarge => "payload_too_large",
            UploadError::Multipart(_) => "invalid_multipart",
            UploadError::IoError(_) => "io_error",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for UploadErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "missing_file" | "invalid_multipart" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "not_found" | "invalid_path" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn upload_failed(e: UploadError) -> UploadErrorResponse {
    match &e {
        UploadError::IoError(_) => tracing::error!("Failed to store upload: {}", e),
        _ => tracing::warn!("Rejected upload: {}", e),
    }
    UploadErrorResponse::from(e)
}

/// POST /api/upload - Store the multipart `file` field on disk
pub async fn upload_file(
    State(state): State<UploadAppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadErrorResponse> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Upload request is not multipart: {}", rejection);
        upload_failed(UploadError::no_file_part())
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_failed(e.into()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A `file` field without a filename is a plain form value, not a file
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if file_name.is_empty() {
            return Err(upload_failed(UploadError::no_selected_file()));
        }

        let data = field.bytes().await.map_err(|e| upload_failed(e.into()))?;
        let stored = state
            .uploads
            .save(&file_name, &data)
            .await
            .map_err(upload_failed)?;

        return Ok(Json(UploadResponse { url: stored.url }));
    }

    Err(upload_failed(UploadError::no_file_part()))
}

/// GET /uploads/:filename - Serve a previously uploaded file
pub async fn serve_upload(
    State(state): State<UploadAppState>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    let path = match state.uploads.resolve(&filename).await {
        Ok(path) => path,
        Err(e) => {
            match &e {
                UploadError::IoError(_) => {
                    tracing::error!("Failed to resolve upload {:?}: {}", filename, e)
                }
                _ => tracing::debug!("Cannot serve upload {:?}: {}", filename, e),
            }
            return UploadErrorResponse::from(e).into_response();
        }
    };

    // ServeFile guesses the content type from the extension
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Build upload and file-serving routes
pub fn upload_routes(state: UploadAppState) -> Router {
    let body_limit = match state.max_upload_size {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/api/upload", post(upload_file).layer(body_limit))
        .route("/uploads/:filename", get(serve_upload))
        .with_state(state)
}
