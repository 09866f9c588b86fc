//! API gateway: URL construction against the remote search service and the
//! network call itself. reqwest only; no retry.

use crate::config::ArtscopeConfig;
use crate::error::FetchError;
use crate::models::{RecordPage, ReferenceEntry, ReferenceListResponse};
use reqwest::Url;
use std::time::Duration;

const API_KEY_PARAM: &str = "apikey";

/// The two facet reference lists served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceResource {
    Century,
    Classification,
}

impl ReferenceResource {
    pub fn path(self) -> &'static str {
        match self {
            ReferenceResource::Century => "century",
            ReferenceResource::Classification => "classification",
        }
    }

    /// Centuries come back in temporal order, classifications alphabetically.
    pub fn sort_field(self) -> &'static str {
        match self {
            ReferenceResource::Century => "temporalorder",
            ReferenceResource::Classification => "name",
        }
    }

    pub fn cache_key(self) -> &'static str {
        match self {
            ReferenceResource::Century => crate::cache::CENTURIES_KEY,
            ReferenceResource::Classification => crate::cache::CLASSIFICATIONS_KEY,
        }
    }
}

/// Builds every URL the explorer sends. Holds the base endpoint and the credential.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    api_key: String,
    reference_page_size: u32,
}

impl Endpoints {
    pub fn new(base: &str, api_key: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base.trim()).map_err(|e| FetchError::Url(format!("{}: {}", base, e)))?;
        Ok(Self {
            base,
            api_key: api_key.trim().to_string(),
            reference_page_size: 100,
        })
    }

    pub fn from_config(cfg: &ArtscopeConfig) -> Result<Self, FetchError> {
        Ok(Self::new(&cfg.api_base, &cfg.api_key)?.with_reference_page_size(cfg.reference_page_size))
    }

    pub fn with_reference_page_size(mut self, size: u32) -> Self {
        self.reference_page_size = size;
        self
    }

    /// Base endpoint as configured; link targets outside it are not followed.
    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    /// True when `url` points at the configured API host.
    pub fn is_api_url(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(u) => {
                u.scheme() == self.base.scheme()
                    && u.host_str() == self.base.host_str()
                    && u.port_or_known_default() == self.base.port_or_known_default()
            }
            Err(_) => false,
        }
    }

    /// `{base}/{resource}?apikey=…&size=…&sort=…`
    pub fn reference_list(&self, resource: ReferenceResource) -> String {
        let size = self.reference_page_size.to_string();
        self.resource_url(
            resource.path(),
            [("size", size.as_str()), ("sort", resource.sort_field())],
        )
    }

    /// `{base}/object?apikey=…` followed by the given pairs, percent-encoded.
    pub fn object_search<'a>(&self, params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        self.resource_url("object", params)
    }

    fn resource_url<'a>(
        &self,
        resource: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> String {
        let mut url = self.base.clone();
        let path = format!("{}/{}", url.path().trim_end_matches('/'), resource);
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair(API_KEY_PARAM, &self.api_key)
            .extend_pairs(params);
        url.into()
    }
}

/// Performs a GET and returns the parsed JSON body.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;

    /// Fetch an object-search page (a built query or an opaque `info.next`/`info.prev` link).
    async fn fetch_page(&self, url: &str) -> Result<RecordPage, FetchError> {
        let body = self.fetch_json(url).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetch one reference list and return its entries.
    async fn fetch_reference_list(&self, url: &str) -> Result<Vec<ReferenceEntry>, FetchError> {
        let body = self.fetch_json(url).await?;
        let parsed: ReferenceListResponse = serde_json::from_value(body)?;
        Ok(parsed.records)
    }
}

/// reqwest-backed client used by the gateway.
pub struct HttpApiClient {
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_config(cfg: &ArtscopeConfig) -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(cfg.request_timeout_secs))
    }
}

#[async_trait::async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        tracing::debug!(target: "artscope::api", url = %redact_key(url), "GET");

        let res = self.client.get(url).send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let snippet: String = text.chars().take(200).collect();
            return Err(FetchError::Status(status.as_u16(), snippet));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Strips the credential from a URL before it reaches the logs.
pub fn redact_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut u) => {
            let pairs: Vec<(String, String)> = u
                .query_pairs()
                .map(|(k, v)| {
                    if k == API_KEY_PARAM {
                        (k.into_owned(), "***".to_string())
                    } else {
                        (k.into_owned(), v.into_owned())
                    }
                })
                .collect();
            if !pairs.is_empty() {
                u.query_pairs_mut().clear().extend_pairs(pairs);
            }
            u.into()
        }
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://api.harvardartmuseums.org", "k-123").unwrap()
    }

    #[test]
    fn reference_list_urls() {
        let e = endpoints();
        assert_eq!(
            e.reference_list(ReferenceResource::Century),
            "https://api.harvardartmuseums.org/century?apikey=k-123&size=100&sort=temporalorder"
        );
        assert_eq!(
            e.reference_list(ReferenceResource::Classification),
            "https://api.harvardartmuseums.org/classification?apikey=k-123&size=100&sort=name"
        );
    }

    #[test]
    fn object_search_encodes_values() {
        let url = endpoints().object_search([("culture", "Roman & Greek")]);
        assert_eq!(
            url,
            "https://api.harvardartmuseums.org/object?apikey=k-123&culture=Roman+%26+Greek"
        );
    }

    #[test]
    fn base_with_path_prefix_is_kept() {
        let e = Endpoints::new("http://localhost:9000/proxy/", "k").unwrap();
        assert_eq!(
            e.object_search(Vec::<(&str, &str)>::new()),
            "http://localhost:9000/proxy/object?apikey=k"
        );
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(Endpoints::new("not a url", "k"), Err(FetchError::Url(_))));
    }

    #[test]
    fn api_url_check_compares_host() {
        let e = endpoints();
        assert!(e.is_api_url("https://api.harvardartmuseums.org/object?page=2"));
        assert!(!e.is_api_url("https://evil.example/object"));
        assert!(!e.is_api_url("mailto:someone@example.org"));
    }

    #[test]
    fn api_url_check_compares_port() {
        let e = endpoints();
        assert!(e.is_api_url("https://api.harvardartmuseums.org:443/object"));
        assert!(!e.is_api_url("https://api.harvardartmuseums.org:8443/object"));

        let local = Endpoints::new("http://localhost:9000", "k").unwrap();
        assert!(local.is_api_url("http://localhost:9000/object?page=2"));
        assert!(!local.is_api_url("http://localhost:9001/object?page=2"));
        assert!(!local.is_api_url("http://localhost/object"));
    }

    #[test]
    fn client_builds_with_configured_timeout() {
        let cfg = ArtscopeConfig {
            request_timeout_secs: 5,
            ..ArtscopeConfig::default()
        };
        assert!(HttpApiClient::from_config(&cfg).is_ok());
    }

    #[test]
    fn redaction_hides_api_key() {
        let out = redact_key("https://api.harvardartmuseums.org/object?apikey=secret&page=2");
        assert!(!out.contains("secret"));
        assert!(out.contains("page=2"));
    }
}
