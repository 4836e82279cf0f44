//! HTTP server layer for DICOM Vault.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     POST /upload          GET /dicom/{file_name}?tag|png        │
//! │                                                                 │
//! │  ┌──────────────────────────────┐  ┌─────────────────────────┐  │
//! │  │          handlers            │  │         routes          │  │
//! │  │ (multipart, query, errors)   │  │ (router, CORS, limits)  │  │
//! │  └──────────────────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    dicom_file_handler, health_handler, upload_handler, ApiError, AppState, AttributeResponse,
    DicomFileQuery, ErrorResponse, HealthResponse, UploadResponse, UPLOAD_FIELD,
};
pub use routes::{create_router, RouterConfig};
