//! PokeAPI client over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::CatalogClient;
use crate::config::EngineConfig;
use crate::error::{CatalogError, Result};
use crate::state::IndexEntry;
use crate::util::percent_encode;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("dexcat/", env!("CARGO_PKG_VERSION"));

/// HTTP implementation of [`CatalogClient`].
///
/// Holds one pooled `reqwest::Client`; cloning is cheap and shares the pool.
#[derive(Clone, Debug)]
pub struct HttpCatalogClient {
    /// Shared connection pool.
    http: reqwest::Client,
    /// Base URL without a trailing slash.
    base_url: String,
}

impl HttpCatalogClient {
    /// What: Build a client from the engine configuration.
    ///
    /// Inputs:
    /// - `config`: Supplies the base URL and request timeout.
    ///
    /// # Errors
    /// - Returns `Network` when the underlying HTTP client cannot be created.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// What: Turn a request path into an absolute URL.
    ///
    /// Inputs:
    /// - `path`: Relative path (e.g. `pokemon?limit=10`) or an absolute URL.
    ///
    /// Output:
    /// - Absolute URLs unchanged; relative paths joined onto the base URL.
    fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// What: GET a URL and decode the body as JSON.
    ///
    /// Inputs:
    /// - `url`: Absolute URL.
    ///
    /// Output:
    /// - Parsed JSON body.
    ///
    /// Details:
    /// - 404 maps to `NotFound(url)`, other non-2xx statuses and transport
    ///   failures to `Network`, undecodable bodies to `MalformedResponse`.
    async fn get_json(&self, url: &str) -> Result<Value> {
        tracing::debug!(url = %url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(format!("request to {url} failed: {e}")))?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Network(format!("HTTP {status} from {url}")));
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(format!("failed to read {url}: {e}")))?;
        serde_json::from_slice(&body)
            .map_err(|e| CatalogError::MalformedResponse(format!("{url}: {e}")))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_index(&self, limit: usize) -> Result<Vec<IndexEntry>> {
        let url = self.endpoint(&format!("pokemon?limit={limit}"));
        let raw = self.get_json(&url).await?;
        super::index::parse_index(&raw)
    }

    async fn fetch_detail(&self, canonical_name: &str) -> Result<Value> {
        let url = self.endpoint(&format!("pokemon/{}", percent_encode(canonical_name)));
        self.get_json(&url).await.map_err(|e| match e {
            CatalogError::NotFound(_) => CatalogError::NotFound(canonical_name.to_string()),
            other => other,
        })
    }

    async fn fetch_species(&self, reference: &str) -> Result<Value> {
        let url = if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            self.endpoint(&format!(
                "pokemon-species/{}",
                percent_encode(reference.trim_matches('/'))
            ))
        };
        self.get_json(&url).await
    }

    async fn fetch_types(&self) -> Result<Vec<String>> {
        let url = self.endpoint("type");
        let raw = self.get_json(&url).await?;
        super::types::parse_type_list(&raw)
    }
}
