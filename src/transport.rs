//! HTTP transport over one upstream endpoint.

use crate::{Error, Result};
use std::time::Duration;

/// Owns the connection pool for one client instance. The pool is not
/// shared across clients; reqwest reconnects transparently when idle
/// connections are closed by the peer.
pub(crate) struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub(crate) fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub(crate) async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        request_id: &str,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .post(&url)
            .json(body)
            .header("x-client-request-id", request_id);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        req.send().await
    }

    pub(crate) async fn get(
        &self,
        path: &str,
        request_id: &str,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.get(&url).header("x-client-request-id", request_id);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        req.send().await
    }
}
