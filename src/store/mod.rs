//! Transactional file storage for uploaded DICOM files.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └──────────┬──────────────────┬───────────┘
//!            │ store            │ read
//!            ▼                  ▼
//! ┌───────────────────┐ ┌───────────────────┐
//! │  FileStore trait  │ │ FileLibrary trait │
//! └─────────┬─────────┘ └─────────┬─────────┘
//!           └──────────┬──────────┘
//!                      ▼
//!           ┌─────────────────────┐
//!           │   LocalFileStore    │
//!           │ (configured root)   │
//!           └─────────────────────┘
//! ```
//!
//! The integrity contract lives in [`FileStore`]: a generated name is only
//! returned when the whole stream landed; otherwise nothing is left behind.

mod local;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::error::StoreError;

pub use local::{generate_file_name, LocalFileStore, DICOM_EXTENSION};

/// A storage backend accepting uploads.
///
/// Implementations must either persist exactly `declared_size` bytes and
/// return the generated identifier, or fail and leave no artifact behind.
/// Concurrent calls are independent: each one generates its own name.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store(
        &self,
        source: &mut (dyn AsyncRead + Unpin + Send),
        declared_size: u64,
        original_name: &str,
    ) -> Result<String, StoreError>;
}

/// Read access to previously stored files by generated name.
#[async_trait]
pub trait FileLibrary: Send + Sync {
    async fn read(&self, file_name: &str) -> Result<Bytes, StoreError>;
}
