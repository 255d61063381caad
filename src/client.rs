use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::FetchError;

pub const DEFAULT_API_BASE: &str = "https://api.mangadex.org";
pub const API_BASE_ENV: &str = "MANGAFETCH_API_BASE";

/// Lower bounds for the politeness delays; smaller requested values are raised.
pub const MIN_LIST_DELAY: Duration = Duration::from_millis(250);
pub const MIN_PAGE_DELAY: Duration = Duration::from_millis(100);

const ERROR_BODY_PREVIEW: usize = 200;

/// Fixed settings shared by every component. Built once per run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub user_agent: String,
    pub json_timeout: Duration,
    pub image_timeout: Duration,
    pub page_size: usize,
    /// Pause between feed page requests.
    pub list_delay: Duration,
    /// Pause after each attempted page download.
    pub page_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            user_agent: format!("mangafetch/{}", env!("CARGO_PKG_VERSION")),
            json_timeout: Duration::from_secs(15),
            image_timeout: Duration::from_secs(20),
            page_size: 100,
            list_delay: Duration::from_millis(250),
            page_delay: Duration::from_millis(150),
        }
    }
}

impl ClientConfig {
    /// Picks the API origin: explicit flag, then `MANGAFETCH_API_BASE`, then the default.
    pub fn resolve_api_base(flag: Option<&str>) -> String {
        flag.map(str::to_owned)
            .or_else(|| std::env::var(API_BASE_ENV).ok())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned())
            .trim_end_matches('/')
            .to_owned()
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let api_base = Url::parse(&config.api_base).context("parse api base")?;
        if api_base.scheme() != "http" && api_base.scheme() != "https" {
            anyhow::bail!("api base must be http/https: {api_base}");
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("user agent header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        tracing::debug!(url, ?query, "GET json");
        let response = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .timeout(self.config.json_timeout)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            let preview: String = raw.chars().take(ERROR_BODY_PREVIEW).collect();
            tracing::debug!(url, status = status.as_u16(), body = %preview, "error response");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        serde_json::from_str(&raw).map_err(|err| FetchError::Malformed {
            url: url.to_owned(),
            detail: err.to_string(),
        })
    }

    /// Starts a binary download; the caller reads the body in chunks.
    pub(crate) async fn get_stream(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        tracing::debug!(url, "GET stream");
        let response = self
            .http
            .get(url)
            .timeout(self.config.image_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_api_base_wins_and_loses_trailing_slash() {
        assert_eq!(
            ClientConfig::resolve_api_base(Some("http://127.0.0.1:9/")),
            "http://127.0.0.1:9"
        );
    }

    #[test]
    fn endpoint_joins_without_double_slash() -> anyhow::Result<()> {
        let client = ApiClient::new(ClientConfig {
            api_base: "http://localhost/".to_owned(),
            ..ClientConfig::default()
        })?;
        assert_eq!(client.endpoint("/manga/x/feed"), "http://localhost/manga/x/feed");
        Ok(())
    }

    #[test]
    fn non_http_api_base_is_rejected() {
        let result = ApiClient::new(ClientConfig {
            api_base: "ftp://example.com".to_owned(),
            ..ClientConfig::default()
        });
        assert!(result.is_err());
    }
}
