//! Command-line interface for the Rota route planner.
//!
//! - `rota route` computes one route through the given positions.
//! - `rota suggest` lists address suggestions for partially typed text.
//! - `rota replay` runs a full route session against a recorded track,
//!   persisting its state in a directory between runs.
//!
//! Options layer flags over `ROTA_CMDS_<COMMAND>_<FIELD>` environment
//! variables and configuration files through `ortho_config`.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

mod error;
mod output;
mod position;
mod replay;
mod route;
mod suggest;

pub use error::CliError;

use replay::ReplayArgs;
use route::RouteArgs;
use suggest::SuggestArgs;

const ARG_API_KEY: &str = "api-key";
const ARG_BASE_URL: &str = "base-url";
const ARG_POSITIONS: &str = "positions";
const ARG_TEXT: &str = "text";
const ARG_STATE_DIR: &str = "state-dir";
const ARG_TRACK: &str = "track";
const ARG_ADD: &str = "add";
const ARG_SEARCH: &str = "search";
const ARG_INTERVAL_MS: &str = "interval-ms";
const ARG_LIMIT: &str = "limit";
const ARG_COUNTRY_SET: &str = "country-set";
const ENV_ROUTE_API_KEY: &str = "ROTA_CMDS_ROUTE_API_KEY";
const ENV_ROUTE_POSITIONS: &str = "ROTA_CMDS_ROUTE_POSITIONS";
const ENV_SUGGEST_API_KEY: &str = "ROTA_CMDS_SUGGEST_API_KEY";
const ENV_SUGGEST_TEXT: &str = "ROTA_CMDS_SUGGEST_TEXT";
const ENV_REPLAY_API_KEY: &str = "ROTA_CMDS_REPLAY_API_KEY";
const ENV_REPLAY_STATE_DIR: &str = "ROTA_CMDS_REPLAY_STATE_DIR";

/// Run the Rota CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure.
pub fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return err.print().map_err(CliError::WriteOutput);
        }
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let mut stdout = std::io::stdout().lock();
    runtime.block_on(dispatch(cli.command, &mut stdout))
}

async fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Route(args) => route::run_route(args, writer).await,
        Command::Suggest(args) => suggest::run_suggest(args, writer).await,
        Command::Replay(args) => replay::run_replay(args, writer).await,
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "rota",
    about = "Multi-stop route planning against a routing service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute a route through two or more positions.
    Route(RouteArgs),
    /// Suggest addresses for partially typed text.
    Suggest(SuggestArgs),
    /// Replay a position track through a persisted route session.
    Replay(ReplayArgs),
}

#[cfg(test)]
mod tests;
