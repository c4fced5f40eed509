//! `replay` command: a full route session driven by a recorded track.
//!
//! The session hydrates from the state directory, plays the track, appends
//! the requested stops and waits for the route to settle before printing the
//! result. Shutting down cancels the playback and flushes the saved state,
//! so a later run picks up where this one stopped.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rota_core::{KeyValueStateStore, RouteGeometry, RouteQueryClient, Waypoint, WaypointList};
use rota_data::geolocation::{DEFAULT_REPLAY_INTERVAL, ReplayGeolocation};
use rota_data::routing::{DEFAULT_ROUTING_BASE_URL, HttpRouteQueryClient};
use rota_data::store::FileKeyValueStore;
use rota_session::{Collaborators, RouteSession, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::position::parse_stop;
use crate::{
    ARG_ADD, ARG_API_KEY, ARG_BASE_URL, ARG_INTERVAL_MS, ARG_SEARCH, ARG_STATE_DIR, ARG_TRACK,
    CliError, ENV_REPLAY_API_KEY, ENV_REPLAY_STATE_DIR,
};

/// CLI arguments for the `replay` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "replay",
    long_about = "Run a route session whose state lives in a directory. \
                 Fixes from the optional track file (a JSON array of \
                 {\"latitude\", \"longitude\"} objects) are played back \
                 first, then each --add stop is appended. The settled \
                 waypoints and route geometry are printed as JSON.",
    about = "Replay a position track through a persisted route session"
)]
#[ortho_config(prefix = "ROTA")]
pub(crate) struct ReplayArgs {
    /// Directory holding the saved session state.
    #[arg(long = ARG_STATE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) state_dir: Option<Utf8PathBuf>,
    /// JSON track of position fixes to replay.
    #[arg(long = ARG_TRACK, value_name = "path")]
    #[serde(default)]
    pub(crate) track: Option<Utf8PathBuf>,
    /// Stop to append after playback, written `lat,lon,address`.
    #[arg(long = ARG_ADD, value_name = "lat,lon,address", allow_hyphen_values = true)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) add: Vec<String>,
    /// Replace the saved search text.
    #[arg(long = ARG_SEARCH, value_name = "text")]
    #[serde(default)]
    pub(crate) search: Option<String>,
    /// Delay between replayed fixes, in milliseconds.
    #[arg(long = ARG_INTERVAL_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) interval_ms: Option<u64>,
    /// API key for the routing service.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the routing service.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
}

impl ReplayArgs {
    pub(crate) fn into_config(self) -> Result<ReplayConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReplayConfig::try_from(merged)
    }
}

/// Resolved `replay` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReplayConfig {
    pub(crate) state_dir: Utf8PathBuf,
    pub(crate) track: Option<Utf8PathBuf>,
    pub(crate) stops: Vec<Waypoint>,
    pub(crate) search: Option<String>,
    pub(crate) interval: Duration,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl TryFrom<ReplayArgs> for ReplayConfig {
    type Error = CliError;

    fn try_from(args: ReplayArgs) -> Result<Self, Self::Error> {
        let state_dir = args.state_dir.ok_or(CliError::MissingArgument {
            field: ARG_STATE_DIR,
            env: ENV_REPLAY_STATE_DIR,
        })?;
        let api_key = args.api_key.ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_REPLAY_API_KEY,
        })?;
        let stops = args
            .add
            .iter()
            .map(|value| parse_stop(value))
            .collect::<Result<Vec<_>, _>>()?;
        let interval = args
            .interval_ms
            .map_or(DEFAULT_REPLAY_INTERVAL, Duration::from_millis);
        Ok(Self {
            state_dir,
            track: args.track,
            stops,
            search: args.search,
            interval,
            api_key,
            base_url: args
                .base_url
                .unwrap_or_else(|| DEFAULT_ROUTING_BASE_URL.to_owned()),
        })
    }
}

/// Settled session state printed by the command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplayOutput {
    pub(crate) waypoints: WaypointList,
    pub(crate) geometry: RouteGeometry,
    pub(crate) search_text: String,
}

pub(crate) async fn run_replay(args: ReplayArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let router = HttpRouteQueryClient::new(config.base_url.clone(), config.api_key.clone())
        .map_err(|source| CliError::BuildClient {
            base_url: config.base_url.clone(),
            source,
        })?;
    run_replay_with(config, Arc::new(router), writer).await
}

pub(crate) async fn run_replay_with(
    config: ReplayConfig,
    router: Arc<dyn RouteQueryClient>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let files =
        FileKeyValueStore::open(&config.state_dir).map_err(|source| CliError::OpenStateDir {
            path: config.state_dir.clone(),
            source,
        })?;
    let geolocation = match &config.track {
        Some(path) => ReplayGeolocation::load(path, config.interval).map_err(|source| {
            CliError::LoadTrack {
                path: path.clone(),
                source,
            }
        })?,
        None => ReplayGeolocation::new(Vec::new(), config.interval),
    };
    let playback = geolocation.playback_duration();
    let session = RouteSession::start(
        SessionConfig::default(),
        Collaborators {
            router,
            geolocation: Arc::new(geolocation),
            store: Arc::new(KeyValueStateStore::new(files)),
        },
    );
    let settled = drive(&session, config.stops, config.search, playback).await;
    session.shutdown().await.map_err(CliError::Session)?;
    write_json(writer, &settled?)
}

async fn drive(
    session: &RouteSession,
    stops: Vec<Waypoint>,
    search: Option<String>,
    playback: Duration,
) -> Result<ReplayOutput, CliError> {
    session.started().await.map_err(CliError::Session)?;
    tokio::time::sleep(playback).await;
    for stop in stops {
        session.append(stop).map_err(CliError::Session)?;
    }
    if let Some(text) = search {
        session.set_search_text(text).map_err(CliError::Session)?;
    }
    session.idle().await.map_err(CliError::Session)?;
    let settled = ReplayOutput {
        waypoints: session.waypoints(),
        geometry: session.geometry(),
        search_text: session.search_text(),
    };
    log::info!(
        "session settled with {} waypoints and {} route points",
        settled.waypoints.len(),
        settled.geometry.len()
    );
    Ok(settled)
}
