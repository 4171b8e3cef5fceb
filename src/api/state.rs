//! Application State
//!
//! Everything a handler needs, built once at startup and cloned into every
//! request. No globals.

use std::sync::Arc;

use serde_json::Value;

use crate::booking::{BookingDesk, FileIntake, JsonFileStore, LogNotifier, Notifier, RecordStore};
use crate::cache::{SharedCache, SHORT_TTL};
use crate::chatbot;
use crate::config::{Config, Profile, SweepMode};
use crate::governor::RequestGovernor;
use crate::upstream::{HttpTransport, NewsFetcher, TransportError, UpstreamTransport};

/// File name of the booking records inside the data directory.
pub const BOOKINGS_FILE: &str = "bookings.json";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub profile: Profile,
    pub sweep: SweepMode,
    /// Identify clients by `X-Forwarded-For` rather than the socket peer
    pub trust_proxy: bool,
    pub cache: SharedCache,
    pub governor: RequestGovernor,
    pub fetcher: NewsFetcher,
    pub bookings: BookingDesk,
    pub chatbot_flow: Arc<Value>,
}

impl AppState {
    /// Wires the state from `config` with explicit collaborators.
    ///
    /// The chatbot flow starts as the bundled document; see
    /// [`AppState::with_chatbot_flow`].
    pub fn new(
        config: &Config,
        transport: Arc<dyn UpstreamTransport>,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let fetcher = NewsFetcher::new(transport, config.upstream_timeout, config.page_limits);
        let bookings = BookingDesk::new(
            store,
            notifier,
            FileIntake::new(&config.upload_dir),
            config.admin_email.clone(),
        );

        Self {
            profile: config.profile,
            sweep: config.sweep,
            trust_proxy: config.trust_proxy,
            cache: SharedCache::new(config.cache_max_entries, SHORT_TTL),
            governor: RequestGovernor::new(
                config.rate_limit_window,
                config.rate_limit_max_requests,
            ),
            fetcher,
            bookings,
            chatbot_flow: Arc::new(chatbot::bundled_flow()),
        }
    }

    /// Creates the production state: reqwest transport, JSON-file records,
    /// log notifier and the configured chatbot flow.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.news_api_base_url, &config.news_api_key)?;
        let store = JsonFileStore::new(config.data_dir.join(BOOKINGS_FILE));
        let flow = chatbot::load_flow(config.chatbot_flow_path.as_deref());

        Ok(
            Self::new(config, Arc::new(transport), Arc::new(store), Arc::new(LogNotifier))
                .with_chatbot_flow(flow),
        )
    }

    pub fn with_chatbot_flow(mut self, flow: Value) -> Self {
        self.chatbot_flow = Arc::new(flow);
        self
    }
}
