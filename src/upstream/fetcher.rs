//! Upstream Fetcher
//!
//! Bounded-time calls to the news API with error classification, payload
//! validation and article filtering.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, warn};

use crate::upstream::{
    RawArticlesPayload, RawSourcesPayload, TransportError, UpstreamReply, UpstreamTransport,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

// == Fetch Error ==
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),

    #[error("upstream rate limit reached")]
    UpstreamRateLimited,

    /// Carries the upstream's detail for server-side logging only
    #[error("upstream rejected credentials: {0}")]
    UpstreamAuthFailed(String),

    #[error("unexpected upstream failure: {0}")]
    UpstreamUnexpected(String),
}

// == Endpoint ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TopHeadlines,
    Everything,
    Sources,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TopHeadlines => "top-headlines",
            Endpoint::Everything => "everything",
            Endpoint::Sources => "top-headlines/sources",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// == Pagination ==
/// Upper bounds on what a single client request may ask the upstream for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub max_page_size: u32,
    pub max_page: u32,
}

/// Clamped page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl PageLimits {
    /// Parses raw query values and clamps them into range.
    ///
    /// Missing or unparsable values fall back to page 1 and the default
    /// page size.
    pub fn clamp(&self, page: Option<&str>, page_size: Option<&str>) -> Pagination {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<i64>().ok());

        let page = parse(page).unwrap_or(1).clamp(1, self.max_page.max(1) as i64) as u32;
        let page_size = parse(page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, self.max_page_size.max(1) as i64) as u32;

        Pagination { page, page_size }
    }
}

// == Payload ==
/// Validated upstream document ready to cache and return.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Articles(crate::upstream::ArticlesPayload),
    Sources(crate::upstream::SourcesPayload),
}

impl Payload {
    pub fn into_value(self) -> Value {
        let value = match self {
            Payload::Articles(p) => serde_json::to_value(p),
            Payload::Sources(p) => serde_json::to_value(p),
        };
        // Plain structs of strings and numbers always serialize
        value.unwrap_or(Value::Null)
    }
}

// == News Fetcher ==
#[derive(Clone)]
pub struct NewsFetcher {
    transport: Arc<dyn UpstreamTransport>,
    timeout: Duration,
    limits: PageLimits,
}

impl NewsFetcher {
    pub fn new(transport: Arc<dyn UpstreamTransport>, timeout: Duration, limits: PageLimits) -> Self {
        Self {
            transport,
            timeout,
            limits,
        }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // == Fetch ==
    /// Calls `endpoint` and returns the filtered payload.
    ///
    /// No retries: any failure is classified and returned immediately.
    pub async fn fetch(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<Payload, FetchError> {
        let query: Vec<(String, String)> = params
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        let reply = match tokio::time::timeout(self.timeout, self.transport.get(endpoint.path(), &query)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(TransportError::TimedOut)) | Err(_) => {
                warn!("Upstream {} timed out after {:?}", endpoint, self.timeout);
                return Err(FetchError::Timeout(self.timeout));
            }
            Ok(Err(e)) => return Err(FetchError::UpstreamUnexpected(e.to_string())),
        };

        classify(endpoint, &reply)?;

        match endpoint {
            Endpoint::TopHeadlines | Endpoint::Everything => {
                let raw: RawArticlesPayload = serde_json::from_value(reply.body)
                    .map_err(|e| FetchError::UpstreamUnexpected(format!("malformed articles payload: {}", e)))?;
                Ok(Payload::Articles(raw.filter()))
            }
            Endpoint::Sources => {
                let raw: RawSourcesPayload = serde_json::from_value(reply.body)
                    .map_err(|e| FetchError::UpstreamUnexpected(format!("malformed sources payload: {}", e)))?;
                Ok(Payload::Sources(raw.filter()))
            }
        }
    }
}

/// Maps non-success replies onto the error taxonomy.
///
/// The news API also reports failures in the body as
/// `{"status":"error","code":...}`, sometimes behind a generic status.
fn classify(endpoint: Endpoint, reply: &UpstreamReply) -> Result<(), FetchError> {
    let body_status = reply.body.get("status").and_then(Value::as_str);
    let code = reply.body.get("code").and_then(Value::as_str).unwrap_or("");
    let message = reply
        .body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no detail");

    if reply.is_success() && body_status != Some("error") {
        return Ok(());
    }

    if reply.status == 429 || code == "rateLimited" {
        warn!("Upstream {} rate limited the proxy", endpoint);
        return Err(FetchError::UpstreamRateLimited);
    }

    if reply.status == 401 || code.starts_with("apiKey") {
        error!(
            "Upstream {} rejected the API key (status {}, code {:?}): {}",
            endpoint, reply.status, code, message
        );
        return Err(FetchError::UpstreamAuthFailed(message.to_string()));
    }

    Err(FetchError::UpstreamUnexpected(format!(
        "status {} code {:?}: {}",
        reply.status, code, message
    )))
}
