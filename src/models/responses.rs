//! Response DTOs for the BFF API
//!
//! Every success body shares the `{success, data?, cached?, timestamp?,
//! message?}` envelope. Failures are rendered by `ApiError`.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::governor::GovernorSettings;

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

// == Envelope ==
/// Success envelope shared by news, booking and chatbot routes.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Present on news routes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    /// Plain success carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            cached: None,
            timestamp: None,
            message: None,
        }
    }

    /// News payload just fetched from the upstream.
    pub fn fresh(data: Value) -> Self {
        Self {
            cached: Some(false),
            timestamp: Some(now_rfc3339()),
            ..Self::ok(data)
        }
    }

    /// News payload served from the cache.
    pub fn cached(data: Value) -> Self {
        Self {
            cached: Some(true),
            ..Self::fresh(data)
        }
    }

    /// Success with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            cached: None,
            timestamp: None,
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// == News Health ==
/// Upstream call limits, reported by the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamSettings {
    pub timeout_ms: u64,
    pub max_page_size: u32,
    pub max_page: u32,
}

/// Response body for `GET /news/health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsHealthResponse {
    pub success: bool,
    pub status: String,
    pub profile: String,
    pub timestamp: String,
    pub cache: CacheStats,
    pub rate_limit: GovernorSettings,
    pub upstream: UpstreamSettings,
}

impl NewsHealthResponse {
    pub fn healthy(
        profile: &str,
        cache: CacheStats,
        rate_limit: GovernorSettings,
        upstream: UpstreamSettings,
    ) -> Self {
        Self {
            success: true,
            status: "healthy".to_string(),
            profile: profile.to_string(),
            timestamp: now_rfc3339(),
            cache,
            rate_limit,
            upstream,
        }
    }
}

/// Response body for `POST /news/clear-cache`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheResponse {
    pub success: bool,
    pub message: String,
    pub cleared_keys: usize,
}

impl ClearCacheResponse {
    pub fn new(cleared_keys: usize) -> Self {
        Self {
            success: true,
            message: format!("Cache cleared ({} keys removed)", cleared_keys),
            cleared_keys,
        }
    }
}

/// Response body for the process-level `GET /health` check
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now_rfc3339(),
        }
    }
}
