//! Configuration management for DICOM Vault.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks using the `DICOM_VAULT_` prefix:
//!
//! - `DICOM_VAULT_HOST` - Server bind address (default: 0.0.0.0)
//! - `DICOM_VAULT_PORT` - Server port (default: 8080)
//! - `DICOM_VAULT_STORAGE_DIR` - Directory for uploaded files (default: ./files)
//! - `DICOM_VAULT_MAX_UPLOAD_SIZE` - Request body cap in bytes (default: 64 MiB)
//! - `DICOM_VAULT_CORS_ORIGINS` - Allowed CORS origins, comma-separated
//!
//! The storage directory is handed to [`LocalFileStore`](crate::store::LocalFileStore)
//! explicitly; nothing reads it from process-wide state.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default storage directory for uploads.
pub const DEFAULT_STORAGE_DIR: &str = "./files";

/// Default request body cap (64 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 64 * 1024 * 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// DICOM Vault - store DICOM files and query their headers and images.
#[derive(Parser, Debug, Clone)]
#[command(name = "dicom-vault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(ServeConfig),

    /// Query a local DICOM file without starting the service.
    Inspect(InspectConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "DICOM_VAULT_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "DICOM_VAULT_PORT")]
    pub port: u16,

    /// Directory uploaded files are written to. Created if missing.
    #[arg(long, default_value = DEFAULT_STORAGE_DIR, env = "DICOM_VAULT_STORAGE_DIR")]
    pub storage_dir: PathBuf,

    /// Maximum accepted request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "DICOM_VAULT_MAX_UPLOAD_SIZE")]
    pub max_upload_size: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "DICOM_VAULT_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage_dir.as_os_str().is_empty() {
            return Err(
                "Storage directory is required. Set --storage-dir or DICOM_VAULT_STORAGE_DIR"
                    .to_string(),
            );
        }

        if self.max_upload_size == 0 {
            return Err("max_upload_size must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Inspect
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// DICOM file to read.
    pub file: PathBuf,

    /// Header attribute to print, as (GGGG,EEEE).
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Write the first frame as PNG to this path.
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InspectConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tag.is_none() && self.png.is_none() {
            return Err("Nothing to do: pass --tag (GGGG,EEEE) and/or --png <OUT>".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
