//! HTTP request handlers for the DICOM Vault API.
//!
//! # Endpoints
//!
//! - `POST /upload` - Validate and store a DICOM file (multipart field `file`)
//! - `GET /dicom/{file_name}?tag=(GGGG,EEEE)` - Read one header attribute
//! - `GET /dicom/{file_name}?png` - Render the first frame as PNG
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::dicom::{
    extract_first_frame, resolve, AttributeResult, DicomDataset, PngFrameEncoder,
    PNG_CONTENT_TYPE,
};
use crate::error::{
    DatasetParseError, EncodeError, ExtractError, ResolveError, StoreError,
};
use crate::store::{FileLibrary, FileStore};

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the file store.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S> {
    /// Storage for uploads and their read-back
    pub store: Arc<S>,
}

impl<S> AppState<S>
where
    S: FileStore + FileLibrary,
{
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for `GET /dicom/{file_name}`.
///
/// When both are present the attribute lookup wins.
#[derive(Debug, Default, Deserialize)]
pub struct DicomFileQuery {
    /// Tag specifier, e.g. `(0008,0080)`
    #[serde(default)]
    pub tag: Option<String>,

    /// Presence flag; any value (including none) requests the image
    #[serde(default)]
    pub png: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_tag")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Reply to a successful upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_name: String,
}

/// Reply to an attribute query.
#[derive(Debug, Serialize)]
pub struct AttributeResponse {
    pub data: AttributeResult,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid search params, at least one of 'tag' or 'png' query param is required")]
    MissingQuery,

    #[error("No 'file' field in the multipart body")]
    MissingUpload,

    #[error("Could not read file - {0}")]
    Multipart(String),

    #[error(transparent)]
    InvalidDicom(#[from] DatasetParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingQuery => (StatusCode::BAD_REQUEST, "missing_query"),
            ApiError::MissingUpload | ApiError::Multipart(_) => {
                (StatusCode::BAD_REQUEST, "invalid_upload")
            }
            ApiError::InvalidDicom(_) => (StatusCode::BAD_REQUEST, "invalid_dicom"),

            ApiError::Resolve(err) => match err {
                ResolveError::EmptySpecifier => (StatusCode::BAD_REQUEST, "empty_tag"),
                ResolveError::MalformedSpecifier { .. } => {
                    (StatusCode::BAD_REQUEST, "malformed_tag")
                }
                ResolveError::InvalidTagComponent { .. } => {
                    (StatusCode::BAD_REQUEST, "invalid_tag_component")
                }
                ResolveError::UnknownTag { .. } => (StatusCode::BAD_REQUEST, "unknown_tag"),
                ResolveError::ElementNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "element_not_found")
                }
            },

            ApiError::Extract(ExtractError::NoPixelData) => {
                (StatusCode::NOT_FOUND, "no_pixel_data")
            }
            ApiError::Extract(ExtractError::FrameDecode { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "frame_decode_error")
            }

            ApiError::Encode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),

            ApiError::Store(err) => match err {
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                StoreError::InvalidFileName(_) => (StatusCode::BAD_REQUEST, "invalid_file_name"),
                StoreError::DirectoryUnavailable { .. }
                | StoreError::DestinationUnavailable { .. }
                | StoreError::IncompleteWrite { .. }
                | StoreError::CleanupFailure { .. }
                | StoreError::Read { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            },

            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// Convert ApiError to HTTP response.
///
/// 5xx errors are logged at ERROR, 404s at DEBUG, other 4xx at WARN.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_kind();
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle uploads.
///
/// # Endpoint
///
/// `POST /upload` with a multipart body holding a `file` field.
///
/// The body is parsed as DICOM before anything touches the disk; only a
/// well-formed file is handed to the store.
///
/// # Response
///
/// - `201 Created`: `{"message": "File saved as: <name>", "file_name": "<name>"}`
/// - `400 Bad Request`: missing field or not a valid DICOM file
/// - `500 Internal Server Error`: the store could not persist the file
pub async fn upload_handler<S>(
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError>
where
    S: FileStore + FileLibrary + 'static,
{
    let (original_name, data) = read_upload_field(&mut multipart).await?;

    let validation = data.clone();
    tokio::task::spawn_blocking(move || DicomDataset::from_bytes(&validation).map(|_| ()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let mut reader: &[u8] = &data;
    let file_name = state
        .store
        .store(&mut reader, data.len() as u64, &original_name)
        .await?;

    info!(file = %file_name, original = %original_name, bytes = data.len(), "Upload accepted");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: format!("File saved as: {}", file_name),
            file_name,
        }),
    ))
}

async fn read_upload_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?;
        return Ok((original_name, data));
    }
    Err(ApiError::MissingUpload)
}

/// Outcome of a `GET /dicom/{file_name}` request.
enum DicomReply {
    Attribute(AttributeResult),
    Png(Bytes),
}

/// Handle header and image queries on a stored file.
///
/// # Endpoint
///
/// `GET /dicom/{file_name}`
///
/// # Query Parameters
///
/// - `tag`: attribute to read, e.g. `(0008,0080)`
/// - `png`: request the first frame as PNG
///
/// `tag` takes precedence when both are given.
///
/// # Response
///
/// - `200 OK`: `{"data": {...}}` for `tag`, `image/png` for `png`
/// - `400 Bad Request`: missing query, bad tag specifier, unknown tag
/// - `404 Not Found`: no such file, element or pixel data
/// - `422 Unprocessable Entity`: a frame failed to decode
pub async fn dicom_file_handler<S>(
    State(state): State<AppState<S>>,
    Path(file_name): Path<String>,
    Query(query): Query<DicomFileQuery>,
) -> Result<Response, ApiError>
where
    S: FileStore + FileLibrary + 'static,
{
    if query.tag.is_none() && query.png.is_none() {
        return Err(ApiError::MissingQuery);
    }

    let data = state.store.read(&file_name).await?;

    let reply = tokio::task::spawn_blocking(move || -> Result<DicomReply, ApiError> {
        let dataset = DicomDataset::from_bytes(&data)?;

        match query.tag {
            Some(specifier) => Ok(DicomReply::Attribute(resolve(&specifier, &dataset)?)),
            None => {
                let frame = extract_first_frame(&dataset)?;
                Ok(DicomReply::Png(PngFrameEncoder::new().encode(&frame)?))
            }
        }
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let response = match reply {
        DicomReply::Attribute(data) => {
            debug!(file = %file_name, tag = %data.tag_values, "Attribute resolved");
            (StatusCode::OK, Json(AttributeResponse { data })).into_response()
        }
        DicomReply::Png(png) => {
            debug!(file = %file_name, bytes = png.len(), "First frame rendered");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, PNG_CONTENT_TYPE)],
                png,
            )
                .into_response()
        }
    };

    Ok(response)
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
