//! # DICOM Vault
//!
//! Storage and inspection service for DICOM medical image files.
//!
//! Files are uploaded over HTTP, validated as DICOM and written to a local
//! directory under a generated name. Stored files can then be queried for a
//! single header attribute by tag, or for their first image frame as PNG.
//!
//! ## Architecture
//!
//! - [`dicom`] - Tag dictionary, attribute resolver and pixel frame extraction
//! - [`store`] - Transactional file store with all-or-nothing writes
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types shared by all layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use dicom_vault::{create_router, LocalFileStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = LocalFileStore::new("./files");
//!     let router = create_router(store, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, router).await
//! }
//! ```

pub mod config;
pub mod dicom;
pub mod error;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{Cli, Command, InspectConfig, ServeConfig};
pub use dicom::{
    extract_first_frame, extract_frames, parse_tag_specifier, resolve, resolve_with,
    AttributeDictionary, AttributeResult, Dataset, DicomDataset, PixelFrame, PixelSource,
    PngFrameEncoder, SampleDepth, StandardTagDictionary, Tag, TagDictionary, TagDictionaryEntry,
};
pub use error::{
    DatasetParseError, DictionaryError, EncodeError, ExtractError, FrameError, ResolveError,
    StoreError, TagParseError, WriteFailure,
};
pub use server::{create_router, ApiError, AppState, ErrorResponse, RouterConfig};
pub use store::{generate_file_name, FileLibrary, FileStore, LocalFileStore};
