//! API Handlers
//!
//! News proxy, chatbot and health handlers. News handlers validate first,
//! then serve from the cache or fetch, store and return.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;

use super::AppState;
use crate::cache::{build_key, Namespace};
use crate::error::{ApiError, Result};
use crate::models::{
    ApiResponse, ClearCacheResponse, HealthResponse, HeadlinesQuery, NewsHealthResponse,
    SearchQuery, SourcesQuery, UpstreamSettings,
};
use crate::upstream::Endpoint;

// == Cache-through ==
/// Looks up `params` under `namespace`; on a miss fetches from `endpoint`
/// and stores the result with the namespace TTL.
///
/// The cache lock is never held across the upstream call. Failed fetches
/// store nothing.
async fn serve_cached(
    state: &AppState,
    namespace: Namespace,
    endpoint: Endpoint,
    params: Vec<(&'static str, String)>,
) -> Result<Json<ApiResponse>> {
    let key_params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let key = build_key(namespace, &key_params);

    if let Some(data) = state.cache.get(&key) {
        debug!("Cache hit: {}", key);
        return Ok(Json(ApiResponse::cached(data)));
    }
    debug!("Cache miss: {}", key);

    let data = state.fetcher.fetch(endpoint, &params).await?.into_value();
    state.cache.set(key, data.clone(), Some(namespace.ttl()));

    Ok(Json(ApiResponse::fresh(data)))
}

/// Handler for GET /news/headlines
pub async fn headlines_handler(
    State(state): State<AppState>,
    Query(query): Query<HeadlinesQuery>,
) -> Result<Json<ApiResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::Validation(error_msg));
    }

    let pagination = state
        .fetcher
        .limits()
        .clamp(query.page.as_deref(), query.page_size.as_deref());

    let params = vec![
        ("category", query.category()),
        ("country", query.country()),
        ("page", pagination.page.to_string()),
        ("pageSize", pagination.page_size.to_string()),
    ];
    serve_cached(&state, Namespace::Headlines, Endpoint::TopHeadlines, params).await
}

/// Handler for GET /news/search
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::Validation(error_msg));
    }

    let pagination = state
        .fetcher
        .limits()
        .clamp(query.page.as_deref(), query.page_size.as_deref());

    let params = vec![
        ("q", query.query().to_string()),
        ("language", query.language()),
        ("sortBy", query.sort_by().to_string()),
        ("page", pagination.page.to_string()),
        ("pageSize", pagination.page_size.to_string()),
    ];
    serve_cached(&state, Namespace::Search, Endpoint::Everything, params).await
}

/// Handler for GET /news/sources
pub async fn sources_handler(
    State(state): State<AppState>,
    Query(query): Query<SourcesQuery>,
) -> Result<Json<ApiResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::Validation(error_msg));
    }

    let params = vec![
        ("category", query.category()),
        ("language", query.language()),
        ("country", query.country()),
    ];
    serve_cached(&state, Namespace::Sources, Endpoint::Sources, params).await
}

/// Handler for GET /news/health
///
/// Always 200; cache and governor reads cannot fail.
pub async fn news_health_handler(State(state): State<AppState>) -> Json<NewsHealthResponse> {
    let limits = state.fetcher.limits();
    let upstream = UpstreamSettings {
        timeout_ms: state.fetcher.timeout().as_millis() as u64,
        max_page_size: limits.max_page_size,
        max_page: limits.max_page,
    };

    Json(NewsHealthResponse::healthy(
        state.profile.as_str(),
        state.cache.stats(),
        state.governor.settings(),
        upstream,
    ))
}

/// Handler for POST /news/clear-cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cleared = state.cache.clear();
    debug!("Cleared {} cache entries", cleared);
    Json(ClearCacheResponse::new(cleared))
}

/// Handler for GET /chatbot/flow
pub async fn chatbot_flow_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    Json(ApiResponse::ok(state.chatbot_flow.as_ref().clone()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
