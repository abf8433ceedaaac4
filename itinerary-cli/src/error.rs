//! Error types emitted by the itinerary CLI.
//!
//! Keep this error type reasonably small; every CLI helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use itinerary_core::OptimizeError;
use itinerary_routing::ProviderBuildError;
use itinerary_solver::AnnealingParamsError;
use thiserror::Error;

/// Errors emitted by the itinerary CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option was present but could not be used.
    #[error("invalid --{field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the request file failed.
    #[error("failed to open request at {path:?}: {source}")]
    OpenRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Request JSON could not be decoded.
    #[error("failed to parse request JSON at {path:?}: {source}")]
    ParseRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Annealing settings were rejected.
    #[error("invalid annealing settings: {0}")]
    AnnealingParams(#[from] AnnealingParamsError),
    /// Constructing the OSRM leg provider failed.
    #[error("failed to build leg provider for {base_url:?}: {source}")]
    BuildLegProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Planning the day failed.
    #[error("optimization failed: {source}")]
    Optimize { source: OptimizeError },
    /// Serializing the result failed.
    #[error("failed to serialize optimization result: {0}")]
    SerializeResult(#[source] serde_json::Error),
    /// Writing the result failed.
    #[error("failed to write optimization result: {0}")]
    WriteOutput(#[source] std::io::Error),
}
