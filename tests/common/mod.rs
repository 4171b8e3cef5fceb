//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, extract::ConnectInfo, http::Request, Router};
use news_bff::booking::{MemoryStore, Notifier, NotifyOutcome, TemplateKind};
use news_bff::upstream::{TransportError, UpstreamReply, UpstreamTransport};
use news_bff::{create_router, AppState, Config};
use serde_json::{json, Value};

// == Scripted Upstream ==
/// In-process stand-in for the news API.
///
/// Answers every call with the same reply, optionally after a delay, and
/// records the path and query of each call.
pub struct ScriptedUpstream {
    reply: UpstreamReply,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedUpstream {
    pub fn replying(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: UpstreamReply::new(status, body),
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: UpstreamReply::new(200, articles_body(&["Late"])),
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_query(&self, name: &str) -> Option<String> {
        let calls = self.calls.lock().unwrap();
        let (_, query) = calls.last()?;
        query.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    pub fn last_path(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(path, _)| path.clone())
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedUpstream {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamReply, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_vec()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.reply.clone())
    }
}

/// Valid article with the given title.
pub fn article(title: &str) -> Value {
    json!({
        "title": title,
        "description": format!("About {}", title),
        "url": format!("https://news.example.com/{}", title.to_lowercase().replace(' ', "-")),
        "urlToImage": "https://news.example.com/img.jpg",
        "publishedAt": "2026-10-17T08:00:00Z",
        "source": {"id": "example", "name": "Example News"},
        "author": "Staff"
    })
}

pub fn articles_body(titles: &[&str]) -> Value {
    let articles: Vec<Value> = titles.iter().map(|t| article(t)).collect();
    json!({"status": "ok", "totalResults": 1000, "articles": articles})
}

// == Notifier ==
/// Notifier that remembers what it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(TemplateKind, Vec<String>)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, template: TemplateKind, recipients: &[String], _data: &Value) -> NotifyOutcome {
        self.sent.lock().unwrap().push((template, recipients.to_vec()));
        NotifyOutcome::delivered("<test@news-bff>")
    }
}

// == App Builders ==
pub fn state_with(config: &Config, upstream: Arc<ScriptedUpstream>) -> AppState {
    AppState::new(
        config,
        upstream,
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNotifier::default()),
    )
}

pub fn app_with(config: &Config, upstream: Arc<ScriptedUpstream>) -> Router {
    create_router(state_with(config, upstream))
}

pub fn app(upstream: Arc<ScriptedUpstream>) -> Router {
    app_with(&Config::default(), upstream)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// GET arriving on a socket from `peer`, as `into_make_service_with_connect_info`
/// would deliver it, optionally carrying an `X-Forwarded-For` header.
pub fn get_from(uri: &str, peer: [u8; 4], forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(client) = forwarded_for {
        builder = builder.header("x-forwarded-for", client);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 40_000))));
    request
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
