//! `route` command: one route through the given positions.

use std::io::Write;

use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rota_core::{RouteQueryClient, VehicleProfile, ensure_routable};
use rota_data::routing::{DEFAULT_ROUTING_BASE_URL, HttpRouteQueryClient};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::position::parse_position;
use crate::{
    ARG_API_KEY, ARG_BASE_URL, ARG_POSITIONS, CliError, ENV_ROUTE_API_KEY, ENV_ROUTE_POSITIONS,
};

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "route",
    long_about = "Compute a truck route through the given positions, in \
                 order, and print its geometry as a JSON array of \
                 [longitude, latitude] pairs.",
    about = "Compute a route through two or more positions"
)]
#[ortho_config(prefix = "ROTA")]
pub(crate) struct RouteArgs {
    /// Positions to visit in order, each written `lat,lon`.
    #[arg(value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) positions: Vec<String>,
    /// API key for the routing service.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the routing service.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteConfig {
    pub(crate) positions: Vec<Coord>,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        if args.positions.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_POSITIONS,
                env: ENV_ROUTE_POSITIONS,
            });
        }
        let positions = args
            .positions
            .iter()
            .map(|value| parse_position(value))
            .collect::<Result<Vec<_>, _>>()?;
        ensure_routable(&positions).map_err(CliError::Route)?;
        let api_key = args.api_key.ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_ROUTE_API_KEY,
        })?;
        let base_url = args
            .base_url
            .unwrap_or_else(|| DEFAULT_ROUTING_BASE_URL.to_owned());
        Ok(Self {
            positions,
            api_key,
            base_url,
        })
    }
}

pub(crate) async fn run_route(args: RouteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let router = HttpRouteQueryClient::new(config.base_url.clone(), config.api_key.clone())
        .map_err(|source| CliError::BuildClient {
            base_url: config.base_url.clone(),
            source,
        })?;
    run_route_with(&config, &router, writer).await
}

pub(crate) async fn run_route_with(
    config: &RouteConfig,
    router: &dyn RouteQueryClient,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let geometry = router
        .compute_route(&config.positions, &VehicleProfile::default())
        .await
        .map_err(CliError::Route)?;
    log::info!("route has {} points", geometry.len());
    write_json(writer, &geometry)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
