//! HTTP transport for running outside the native host.
//!
//! Every game operation maps to one JSON request against a fixed base URL.

use crate::error::{TransportError, TransportResult};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error};

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// Base URL every operation path is appended to.
    pub base_url: String,
    /// Request timeout (in seconds).
    pub timeout_secs: u64,
    /// Headers sent with every request unless overridden per call.
    pub default_headers: BTreeMap<String, String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            default_headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
        }
    }
}

/// One request, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Creates a request with no body and no header overrides.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// A `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides a header for this request only.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// JSON-over-HTTP transport.
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: Client,
}

impl HttpTransport {
    /// Creates a new HTTP transport.
    pub fn new(config: HttpTransportConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Full URL for an operation path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Sends `request` and parses the JSON response.
    ///
    /// A non-success status becomes [`TransportError::Status`] carrying the
    /// response body text. An empty success body yields `Value::Null`.
    pub async fn send(&self, request: HttpRequest) -> TransportResult<Value> {
        let url = self.url_for(&request.path);
        debug!("{} {url}", request.method);

        let mut builder = self.client.request(request.method.clone(), &url);
        for (name, value) in merge_headers(&self.config.default_headers, &request.headers) {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_string(body)?);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Request to {url} failed: {e}");
            TransportError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Reading response from {url} failed: {e}");
            TransportError::Network(e.to_string())
        })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Per-call headers replace defaults with the same name, ignoring case.
fn merge_headers(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .filter(|(name, _)| !overrides.keys().any(|o| o.eq_ignore_ascii_case(name)))
        .map(|(n, v)| (n.clone(), v.clone()))
        .collect();
    merged.extend(overrides.iter().map(|(n, v)| (n.clone(), v.clone())));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_headers_override_is_case_insensitive() {
        let defaults = HttpTransportConfig::default().default_headers;
        let overrides = BTreeMap::from([("content-type".to_string(), "text/plain".to_string())]);
        let merged = merge_headers(&defaults, &overrides);
        assert_eq!(merged, vec![("content-type".to_string(), "text/plain".to_string())]);
    }

    #[test]
    fn merge_headers_keeps_defaults() {
        let defaults = HttpTransportConfig::default().default_headers;
        let overrides = BTreeMap::from([("X-Player".to_string(), "p1".to_string())]);
        let merged = merge_headers(&defaults, &overrides);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].0, "Content-Type");
    }
}
