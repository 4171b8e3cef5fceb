//! Integration Tests for the News Proxy
//!
//! Full request/response cycle through the router, the governor, the
//! cache and a scripted upstream.

mod common;

use std::time::Duration;

use axum::http::{header::RETRY_AFTER, StatusCode};
use news_bff::{create_router, Config};
use serde_json::json;
use tower::ServiceExt;

use common::{
    app, app_with, article, articles_body, body_to_json, get, get_from, post, state_with,
    ScriptedUpstream,
};

// == Headlines ==

#[tokio::test]
async fn test_headlines_second_call_is_cached() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha", "Beta"]));
    let app = app(upstream.clone());

    let first = app
        .clone()
        .oneshot(get("/news/headlines?category=business&country=us&page=1&pageSize=20"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_to_json(first.into_body()).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["cached"], false);

    let second = app
        .oneshot(get("/news/headlines?category=business&country=us&page=1&pageSize=20"))
        .await
        .unwrap();
    let second = body_to_json(second.into_body()).await;
    assert_eq!(second["cached"], true);
    assert_eq!(second["data"]["articles"], first["data"]["articles"]);
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn test_equivalent_queries_share_a_cache_entry() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha"]));
    let app = app(upstream.clone());

    for uri in [
        "/news/headlines?category=Business&page=05&pageSize=20",
        "/news/headlines?pageSize=20&page=5&category=business&country=us",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn test_country_is_forwarded_as_cached() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha"]));
    let app = app(upstream.clone());

    let first = app
        .clone()
        .oneshot(get("/news/headlines?country=US"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(upstream.last_query("country").as_deref(), Some("us"));

    let second = app.oneshot(get("/news/headlines?country=us")).await.unwrap();
    let second = body_to_json(second.into_body()).await;
    assert_eq!(second["cached"], true);
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn test_search_language_is_forwarded_lowercase() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha"]));
    let app = app(upstream.clone());

    let response = app
        .oneshot(get("/news/search?q=rust&language=EN"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.last_query("language").as_deref(), Some("en"));
}

#[tokio::test]
async fn test_mistyped_article_does_not_fail_the_page() {
    let body = json!({
        "status": "ok",
        "totalResults": 3,
        "articles": [
            article("Kept"),
            {"title": 42, "description": "x", "url": "u", "urlToImage": "i"},
            "junk",
        ]
    });
    let app = app(ScriptedUpstream::replying(200, body));

    let response = app.oneshot(get("/news/headlines")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["data"]["totalResults"], 1);
    assert_eq!(json["data"]["articles"][0]["title"], "Kept");
}

#[tokio::test]
async fn test_headlines_filters_articles_and_recounts() {
    let mut body = articles_body(&["Kept"]);
    body["articles"]
        .as_array_mut()
        .unwrap()
        .extend([
            json!({"title": "[Removed]", "description": "x", "url": "u", "urlToImage": "i"}),
            json!({"title": "No image", "description": "x", "url": "u"}),
        ]);
    let app = app(ScriptedUpstream::replying(200, body));

    let response = app.oneshot(get("/news/headlines")).await.unwrap();
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["data"]["totalResults"], 1);
    assert_eq!(json["data"]["articles"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["articles"][0]["title"], "Kept");
}

#[tokio::test]
async fn test_invalid_category_rejected_before_upstream() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha"]));
    let app = app(upstream.clone());

    let response = app
        .oneshot(get("/news/headlines?category=politics"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    let message = json["message"].as_str().unwrap();
    for category in [
        "business",
        "entertainment",
        "general",
        "health",
        "science",
        "sports",
        "technology",
    ] {
        assert!(message.contains(category), "{} not listed", category);
    }
    assert_eq!(upstream.call_count(), 0);
}

#[tokio::test]
async fn test_pagination_is_clamped_before_forwarding() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha"]));
    let app = app(upstream.clone());

    let response = app
        .oneshot(get("/news/headlines?page=99&pageSize=500"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(upstream.last_path().as_deref(), Some("top-headlines"));
    assert_eq!(upstream.last_query("pageSize").as_deref(), Some("100"));
    assert_eq!(upstream.last_query("page").as_deref(), Some("10"));
}

// == Search ==

#[tokio::test]
async fn test_short_search_query_rejected() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha"]));
    let app = app(upstream.clone());

    let response = app.oneshot(get("/news/search?q=a")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("at least 2 characters"));
    assert_eq!(upstream.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_sort_rejected() {
    let app = app(ScriptedUpstream::replying(200, articles_body(&["Alpha"])));

    let response = app
        .oneshot(get("/news/search?q=rust&sortBy=newest"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_forwards_trimmed_query() {
    let upstream = ScriptedUpstream::replying(200, articles_body(&["Alpha"]));
    let app = app(upstream.clone());

    let response = app
        .oneshot(get("/news/search?q=%20climate%20change%20&sortBy=popularity"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(upstream.last_path().as_deref(), Some("everything"));
    assert_eq!(upstream.last_query("q").as_deref(), Some("climate change"));
    assert_eq!(upstream.last_query("sortBy").as_deref(), Some("popularity"));
}

// == Sources ==

#[tokio::test]
async fn test_sources_drop_incomplete_entries() {
    let body = json!({
        "status": "ok",
        "sources": [
            {"id": "bbc-news", "name": "BBC News", "category": "general"},
            {"id": null, "name": "Anonymous"}
        ]
    });
    let upstream = ScriptedUpstream::replying(200, body);
    let app = app(upstream.clone());

    let response = app.oneshot(get("/news/sources")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["data"]["sources"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["sources"][0]["id"], "bbc-news");
    assert_eq!(upstream.last_path().as_deref(), Some("top-headlines/sources"));
}

// == Upstream Failures ==

#[tokio::test(start_paused = true)]
async fn test_upstream_timeout_returns_408_and_caches_nothing() {
    let app = app(ScriptedUpstream::slow(Duration::from_secs(30)));

    let response = app
        .clone()
        .oneshot(get("/news/headlines?category=science"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(
        response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
        Some("5")
    );
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["retryAfter"], 5);

    let health = app.oneshot(get("/news/health")).await.unwrap();
    let health = body_to_json(health.into_body()).await;
    assert_eq!(health["cache"]["size"], 0);
}

#[tokio::test]
async fn test_upstream_rate_limit_returns_429() {
    let upstream = ScriptedUpstream::replying(
        429,
        json!({"status": "error", "code": "rateLimited", "message": "slow down"}),
    );
    let app = app(upstream);

    let response = app.oneshot(get("/news/headlines")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["retryAfter"], 60);
}

#[tokio::test]
async fn test_upstream_auth_failure_is_generic_500() {
    let upstream = ScriptedUpstream::replying(
        401,
        json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key abc123 is invalid"}),
    );
    let app = app(upstream.clone());

    let response = app
        .clone()
        .oneshot(get("/news/headlines"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert!(!json.to_string().contains("abc123"));

    // Failure is not cached: the next call goes upstream again
    app.oneshot(get("/news/headlines")).await.unwrap();
    assert_eq!(upstream.call_count(), 2);
}

// == Governor ==

#[tokio::test]
async fn test_governor_denies_over_limit_per_client() {
    let config = Config {
        rate_limit_max_requests: 2,
        ..Config::default()
    };
    let app = app_with(&config, ScriptedUpstream::replying(200, articles_body(&["Alpha"])));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_from("/news/headlines", [198, 51, 100, 1], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let denied = app
        .clone()
        .oneshot(get_from("/news/headlines", [198, 51, 100, 1], None))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(denied.headers().contains_key(RETRY_AFTER));
    let json = body_to_json(denied.into_body()).await;
    assert!(json["retryAfter"].as_u64().unwrap() > 0);

    let other = app
        .oneshot(get_from("/news/headlines", [198, 51, 100, 2], None))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_header_does_not_reset_limit() {
    let config = Config {
        rate_limit_max_requests: 2,
        ..Config::default()
    };
    let app = app_with(&config, ScriptedUpstream::replying(200, articles_body(&["Alpha"])));

    let mut statuses = Vec::new();
    for forged in ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"] {
        let response = app
            .clone()
            .oneshot(get_from("/news/headlines", [203, 0, 113, 9], Some(forged)))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(
        statuses,
        [
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}

#[tokio::test]
async fn test_forwarded_header_counts_clients_behind_trusted_proxy() {
    let config = Config {
        rate_limit_max_requests: 1,
        trust_proxy: true,
        ..Config::default()
    };
    let app = app_with(&config, ScriptedUpstream::replying(200, articles_body(&["Alpha"])));
    let proxy = [10, 0, 0, 1];

    let first = app
        .clone()
        .oneshot(get_from("/news/headlines", proxy, Some("198.51.100.1")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let again = app
        .clone()
        .oneshot(get_from("/news/headlines", proxy, Some("198.51.100.1")))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app
        .oneshot(get_from("/news/headlines", proxy, Some("198.51.100.2")))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_governor_leaves_booking_routes_alone() {
    let config = Config {
        rate_limit_max_requests: 1,
        ..Config::default()
    };
    let app = app_with(&config, ScriptedUpstream::replying(200, articles_body(&[])));

    for _ in 0..3 {
        let response = app.clone().oneshot(get("/chatbot/flow")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// == Health & Clear ==

#[tokio::test]
async fn test_clear_cache_then_health_reports_empty() {
    let app = app(ScriptedUpstream::replying(200, articles_body(&["Alpha"])));

    for uri in [
        "/news/headlines?category=business",
        "/news/headlines?category=sports",
        "/news/search?q=rust",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(post("/news/clear-cache")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["clearedKeys"], 3);

    let health = app.oneshot(get("/news/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let health = body_to_json(health.into_body()).await;
    assert_eq!(health["cache"]["size"], 0);
}

#[tokio::test]
async fn test_health_reports_profile_and_limits() {
    let app = app_with(
        &Config::serverless(),
        ScriptedUpstream::replying(200, articles_body(&[])),
    );

    let response = app.oneshot(get("/news/health")).await.unwrap();
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["profile"], "serverless");
    assert_eq!(json["cache"]["capacity"], 20);
    assert_eq!(json["rateLimit"]["maxRequests"], 200);
    assert_eq!(json["rateLimit"]["windowMs"], 900_000);
    assert_eq!(json["upstream"]["maxPageSize"], 50);
}

#[tokio::test(start_paused = true)]
async fn test_serverless_sweeps_before_each_request() {
    let state = state_with(
        &Config::serverless(),
        ScriptedUpstream::replying(200, articles_body(&["Alpha"])),
    );
    let governor = state.governor.clone();
    let app = create_router(state);

    app.clone()
        .oneshot(get_from("/news/headlines", [198, 51, 100, 1], None))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(301)).await;

    let health = app
        .clone()
        .oneshot(get_from("/news/health", [198, 51, 100, 1], None))
        .await
        .unwrap();
    let health = body_to_json(health.into_body()).await;

    assert_eq!(health["cache"]["size"], 0);
    // Removed by the sweep, not by a lookup
    assert_eq!(health["cache"]["missCount"], 1);
    assert_eq!(governor.tracked_clients(), 1);

    // Past the 15 minute window the first client's counter is pruned
    tokio::time::advance(Duration::from_secs(900)).await;
    app.oneshot(get_from("/news/health", [198, 51, 100, 2], None))
        .await
        .unwrap();
    assert_eq!(governor.tracked_clients(), 1);
}
