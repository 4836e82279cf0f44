//! DICOM Vault - store DICOM files and query their headers and images.
//!
//! This binary starts the HTTP server or inspects a local file.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dicom_vault::{
    config::{Cli, Command, InspectConfig, ServeConfig},
    dicom::{extract_first_frame, resolve, DicomDataset, PngFrameEncoder},
    server::{create_router, RouterConfig},
    store::LocalFileStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Inspect(config) => run_inspect(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("DICOM Vault v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Storage directory: {}", config.storage_dir.display());
    info!("  Max upload size: {} bytes", config.max_upload_size);
    match config.cors_origins {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    // The directory is created lazily by the store on first upload.
    let store = LocalFileStore::new(config.storage_dir.clone());
    let router = create_router(store, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl -F file=@scan.dcm http://{}/upload", addr);
    info!("    curl 'http://{}/dicom/<file_name>?tag=(0008,0080)'", addr);
    info!("    curl -o frame.png 'http://{}/dicom/<file_name>?png'", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dicom_vault=debug,tower_http=debug"
    } else {
        "dicom_vault=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_max_upload_size(config.max_upload_size)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Inspect Command
// =============================================================================

async fn run_inspect(config: InspectConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let dataset = match DicomDataset::open(&config.file) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref specifier) = config.tag {
        let result = match resolve(specifier, &dataset) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        };

        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(ref out) = config.png {
        let png = extract_first_frame(&dataset)
            .map_err(|e| e.to_string())
            .and_then(|frame| {
                PngFrameEncoder::new()
                    .encode(&frame)
                    .map_err(|e| e.to_string())
            });

        let png = match png {
            Ok(png) => png,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        };

        if let Err(e) = tokio::fs::write(out, &png).await {
            eprintln!("Error: could not write {}: {}", out.display(), e);
            return ExitCode::FAILURE;
        }
        println!("Wrote first frame to {} ({} bytes)", out.display(), png.len());
    }

    ExitCode::SUCCESS
}
