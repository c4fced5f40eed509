//! Shared HTTP client construction for provider adapters.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Default user agent for provider requests.
pub const DEFAULT_USER_AGENT: &str = "rota/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while building an HTTP-backed adapter.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured base URL is not usable.
    #[error("invalid base URL {url:?}: {message}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Why it was rejected.
        message: String,
    },
}

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ClientBuildError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(ClientBuildError::HttpClient)
}

/// Parse `raw` into a URL that accepts appended path segments.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let url = Url::parse(raw).map_err(|err| ClientBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        message: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientBuildError::InvalidBaseUrl {
            url: raw.to_owned(),
            message: "URL cannot carry path segments".to_owned(),
        });
    }
    Ok(url)
}

/// Append `segments` to `base`, dropping any trailing empty segment.
pub(crate) fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Render `url` without its query string, for errors and logs.
pub(crate) fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://api.example.com", "https://api.example.com/a/b")]
    #[case("https://api.example.com/", "https://api.example.com/a/b")]
    #[case("https://api.example.com/v2/", "https://api.example.com/v2/a/b")]
    fn joins_segments_without_double_slashes(#[case] base: &str, #[case] expected: &str) {
        let url = parse_base_url(base).expect("valid base");
        assert_eq!(join_segments(&url, ["a", "b"]).as_str(), expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn rejects_unusable_base_urls(#[case] raw: &str) {
        assert!(matches!(
            parse_base_url(raw),
            Err(ClientBuildError::InvalidBaseUrl { .. })
        ));
    }

    #[rstest]
    fn redaction_strips_credentials() {
        let url = Url::parse("https://api.example.com/x?key=secret&limit=5").expect("valid url");
        assert_eq!(redact(&url), "https://api.example.com/x");
    }
}
