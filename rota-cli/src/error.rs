//! Error types emitted by the Rota CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use rota_core::geolocation::GeolocationError;
use rota_core::{RouteError, StorageError};
use rota_data::ClientBuildError;
use rota_data::geocoding::GeocodeError;
use rota_session::SessionError;
use thiserror::Error;

/// Errors emitted by the Rota CLI.
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
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A position argument is not a `lat,lon` pair.
    #[error("invalid position {value:?}: expected lat,lon")]
    InvalidPosition {
        /// Offending argument.
        value: String,
    },
    /// A stop argument is not a `lat,lon,address` triple.
    #[error("invalid stop {value:?}: expected lat,lon,address")]
    InvalidStop {
        /// Offending argument.
        value: String,
    },
    /// The async runtime could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Constructing an HTTP client failed.
    #[error("failed to build client for {base_url:?}: {source}")]
    BuildClient {
        /// Configured base URL.
        base_url: String,
        /// Underlying failure.
        #[source]
        source: ClientBuildError,
    },
    /// The routing provider failed.
    #[error("route request failed: {0}")]
    Route(#[source] RouteError),
    /// The geocoding provider failed.
    #[error("suggestion request failed: {0}")]
    Suggest(#[source] GeocodeError),
    /// The state directory could not be opened.
    #[error("failed to open state directory {path:?}: {source}")]
    OpenStateDir {
        /// Configured directory.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: StorageError,
    },
    /// The position track could not be loaded.
    #[error("failed to load track {path:?}: {source}")]
    LoadTrack {
        /// Configured track file.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: GeolocationError,
    },
    /// The route session ended abnormally.
    #[error("route session failed: {0}")]
    Session(#[source] SessionError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
