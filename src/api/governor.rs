//! Governor Middleware
//!
//! Admits or rejects every request to the news routes before it reaches a
//! handler. In the serverless profile it also sweeps the cache and prunes
//! expired rate-limit windows first.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, warn};

use super::AppState;
use crate::config::SweepMode;
use crate::error::{ApiError, Result};
use crate::governor::Admission;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity a request is counted under.
///
/// The socket peer IP by default. With `trust_proxy` the first
/// `X-Forwarded-For` entry takes precedence. `"unknown"` when neither is
/// available.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| headers.get(FORWARDED_FOR))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(client), _) => client.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

pub async fn governor_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if state.sweep == SweepMode::PerRequest {
        let removed = state.cache.sweep();
        let pruned = state.governor.prune();
        if removed > 0 || pruned > 0 {
            info!(
                "Request sweep removed {} expired entries, pruned {} rate-limit windows",
                removed, pruned
            );
        }
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_identity(request.headers(), peer, state.trust_proxy);

    match state.governor.admit(&client) {
        Admission::Allowed { remaining } => {
            debug!("Admitted {} ({} requests left)", client, remaining);
            Ok(next.run(request).await)
        }
        Admission::Denied { retry_after } => {
            warn!("Rate limit exceeded for {}, retry in {:?}", client, retry_after);
            Err(ApiError::GovernorDenied { retry_after })
        }
    }
}
