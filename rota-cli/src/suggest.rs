//! `suggest` command: typeahead address suggestions.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rota_data::geocoding::{HttpGeocoder, HttpGeocoderConfig};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::{
    ARG_API_KEY, ARG_BASE_URL, ARG_COUNTRY_SET, ARG_LIMIT, ARG_TEXT, CliError,
    ENV_SUGGEST_API_KEY, ENV_SUGGEST_TEXT,
};

/// CLI arguments for the `suggest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "suggest",
    about = "Suggest addresses for partially typed text"
)]
#[ortho_config(prefix = "ROTA")]
pub(crate) struct SuggestArgs {
    /// Text typed so far.
    #[arg(value_name = "text")]
    #[serde(default)]
    pub(crate) text: Option<String>,
    /// API key for the search service.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the search service.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Maximum number of suggestions.
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<u8>,
    /// Comma-separated ISO country codes restricting matches.
    #[arg(long = ARG_COUNTRY_SET, value_name = "codes")]
    #[serde(default)]
    pub(crate) country_set: Option<String>,
}

impl SuggestArgs {
    pub(crate) fn into_config(self) -> Result<SuggestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SuggestConfig::try_from(merged)
    }
}

/// Resolved `suggest` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct SuggestConfig {
    pub(crate) text: String,
    pub(crate) geocoder: HttpGeocoderConfig,
}

impl TryFrom<SuggestArgs> for SuggestConfig {
    type Error = CliError;

    fn try_from(args: SuggestArgs) -> Result<Self, Self::Error> {
        let text = args.text.ok_or(CliError::MissingArgument {
            field: ARG_TEXT,
            env: ENV_SUGGEST_TEXT,
        })?;
        let api_key = args.api_key.ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_SUGGEST_API_KEY,
        })?;
        let mut geocoder = HttpGeocoderConfig {
            api_key,
            ..HttpGeocoderConfig::default()
        };
        if let Some(base_url) = args.base_url {
            geocoder.base_url = base_url;
        }
        if let Some(limit) = args.limit {
            geocoder = geocoder.with_limit(limit);
        }
        if let Some(country_set) = args.country_set {
            geocoder = geocoder.with_country_set(country_set);
        }
        Ok(Self { text, geocoder })
    }
}

pub(crate) async fn run_suggest(args: SuggestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let base_url = config.geocoder.base_url.clone();
    let geocoder = HttpGeocoder::with_config(config.geocoder)
        .map_err(|source| CliError::BuildClient { base_url, source })?;
    let suggestions = geocoder
        .suggest(&config.text)
        .await
        .map_err(CliError::Suggest)?;
    write_json(writer, &suggestions)
}
