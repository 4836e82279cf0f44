//! Local filesystem file store.
//!
//! Files land in a single configured directory under a generated name
//! `<uuid>-<original name>[.dcm]`. A write either leaves a file whose length
//! equals the declared size, or leaves nothing: on a copy error or a size
//! mismatch the partial file is removed before the error is returned.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{FileLibrary, FileStore};
use crate::error::{StoreError, WriteFailure};

/// Extension appended to stored names that do not already carry it.
pub const DICOM_EXTENSION: &str = ".dcm";

/// Name used when the caller supplies no usable original name.
const FALLBACK_NAME: &str = "upload";

/// File store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store writing into `root`.
    ///
    /// The directory is created on first write if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a stored file, after checking the name is a bare file name.
    pub fn path_of(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        if !is_bare_file_name(file_name) {
            return Err(StoreError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }

    /// Remove a partially written file and build the matching error.
    async fn roll_back(&self, path: &Path, file_name: String, failure: WriteFailure) -> StoreError {
        match fs::remove_file(path).await {
            Ok(()) => {
                warn!(file = %file_name, %failure, "Upload failed, partial file removed");
                StoreError::IncompleteWrite { file_name, failure }
            }
            Err(e) => {
                warn!(file = %file_name, %failure, cleanup = %e, "Upload failed, partial file left behind");
                StoreError::CleanupFailure {
                    file_name,
                    failure,
                    cleanup: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        source: &mut (dyn AsyncRead + Unpin + Send),
        declared_size: u64,
        original_name: &str,
    ) -> Result<String, StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::DirectoryUnavailable {
                path: self.root.display().to_string(),
                message: e.to_string(),
            })?;

        let file_name = generate_file_name(original_name);
        let path = self.root.join(&file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::DestinationUnavailable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        debug!(file = %file_name, declared_size, "Writing upload");

        // One byte past the declared size is enough to detect an over-long stream
        let mut limited = source.take(declared_size.saturating_add(1));
        let outcome = copy_counted(&mut limited, &mut file, declared_size).await;
        drop(file);

        match outcome {
            Ok(()) => {
                info!(file = %file_name, bytes = declared_size, "Stored upload");
                Ok(file_name)
            }
            Err(failure) => Err(self.roll_back(&path, file_name, failure).await),
        }
    }
}

#[async_trait]
impl FileLibrary for LocalFileStore {
    async fn read(&self, file_name: &str) -> Result<Bytes, StoreError> {
        let path = self.path_of(file_name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(StoreError::Read {
                file_name: file_name.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Copy the whole source into the file, sync it, then compare lengths.
async fn copy_counted<R>(
    source: &mut R,
    file: &mut fs::File,
    declared_size: u64,
) -> Result<(), WriteFailure>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut written = 0u64;
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = source.read(&mut buf).await.map_err(|e| WriteFailure::Copy {
            written,
            message: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .await
            .map_err(|e| WriteFailure::Copy {
                written,
                message: e.to_string(),
            })?;
        written += n as u64;
    }

    let sync = async {
        file.flush().await?;
        file.sync_all().await
    };
    sync.await.map_err(|e| WriteFailure::Copy {
        written,
        message: e.to_string(),
    })?;

    if written != declared_size {
        return Err(WriteFailure::SizeMismatch {
            declared: declared_size,
            written,
        });
    }
    Ok(())
}

/// Build a collision-resistant stored name for an upload.
///
/// Only the last path component of `original_name` is kept, and `.dcm` is
/// appended unless the name already ends with it (case-sensitive).
pub fn generate_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_NAME);

    let mut name = format!("{}-{}", Uuid::new_v4(), base);
    if !name.ends_with(DICOM_EXTENSION) {
        name.push_str(DICOM_EXTENSION);
    }
    name
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}
