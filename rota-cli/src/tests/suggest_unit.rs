//! Unit tests covering `suggest` configuration.

use super::*;
use crate::suggest::SuggestConfig;
use rota_data::geocoding::{DEFAULT_COUNTRY_SET, DEFAULT_SUGGESTION_LIMIT};
use rstest::rstest;

fn args(text: Option<&str>) -> SuggestArgs {
    SuggestArgs {
        text: text.map(str::to_owned),
        api_key: Some("secret".to_owned()),
        ..SuggestArgs::default()
    }
}

#[rstest]
fn converting_suggest_applies_defaults() {
    let config = SuggestConfig::try_from(args(Some("padaria"))).expect("config should build");
    assert_eq!(config.text, "padaria");
    assert_eq!(config.geocoder.limit, DEFAULT_SUGGESTION_LIMIT);
    assert_eq!(config.geocoder.country_set, DEFAULT_COUNTRY_SET);
    assert_eq!(config.geocoder.api_key, "secret");
}

#[rstest]
fn converting_suggest_applies_overrides() {
    let config = SuggestConfig::try_from(SuggestArgs {
        limit: Some(3),
        country_set: Some("PT".to_owned()),
        base_url: Some("http://localhost:9000".to_owned()),
        ..args(Some("rua"))
    })
    .expect("config should build");
    assert_eq!(config.geocoder.limit, 3);
    assert_eq!(config.geocoder.country_set, "PT");
    assert_eq!(config.geocoder.base_url, "http://localhost:9000");
}

#[rstest]
fn converting_suggest_without_text_errors() {
    match SuggestConfig::try_from(args(None)) {
        Err(CliError::MissingArgument { field, env }) => {
            assert_eq!(field, ARG_TEXT);
            assert_eq!(env, ENV_SUGGEST_TEXT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}
