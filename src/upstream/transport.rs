//! Upstream Transport
//!
//! The raw HTTP seam between the fetcher and the news API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

/// Header the news API reads the credential from.
const API_KEY_HEADER: &str = "X-Api-Key";

// == Transport Error ==
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("upstream request timed out")]
    TimedOut,
}

// == Upstream Reply ==
/// Status and decoded body of an upstream response.
///
/// A body that is not JSON decodes to `Value::Null`.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// == Transport Trait ==
/// Issues GET requests against the news API.
///
/// `path` is relative to the API base (e.g. `top-headlines`).
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)])
        -> Result<UpstreamReply, TransportError>;
}

// == HTTP Transport ==
/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpTransport {
    /// Builds a client that sends `api_key` with every request.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, TransportError> {
        // Trailing slash so that `join` appends instead of replacing the last segment
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            reqwest::Url::parse(&base).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("news-bff/", env!("CARGO_PKG_VERSION"))),
        );
        if !api_key.is_empty() {
            let mut value = HeaderValue::from_str(api_key)
                .map_err(|_| TransportError::RequestFailed("API key is not a valid header".into()))?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamReply, TransportError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        debug!("Upstream GET {} ({} params)", url, query.len());

        let resp = self.client.get(url).query(query).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::TimedOut
            } else {
                TransportError::RequestFailed(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(UpstreamReply { status, body })
    }
}
