//! Configuration Module
//!
//! Loads server configuration from environment variables on top of a
//! deployment profile preset.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::upstream::PageLimits;

// == Deployment Profile ==
/// The two ways the proxy is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Long-lived process with a background sweep timer
    Server,
    /// Per-invocation process; sweeps at the top of every request
    Serverless,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Server => "server",
            Profile::Serverless => "serverless",
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Profile::Server),
            "serverless" | "lambda" | "function" => Ok(Profile::Serverless),
            other => Err(format!("unknown deployment profile '{}'", other)),
        }
    }
}

// == Sweep Mode ==
/// When expired cache entries are swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    /// Background task on a fixed interval
    Interval(Duration),
    /// Synchronously before every request
    PerRequest,
}

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    /// HTTP server port
    pub server_port: u16,

    // Cache
    pub cache_max_entries: usize,
    pub sweep: SweepMode,

    // Governor
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u32,
    /// Count clients by the first `X-Forwarded-For` entry instead of the
    /// socket peer. Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,

    // Upstream
    pub news_api_key: String,
    pub news_api_base_url: String,
    pub upstream_timeout: Duration,
    pub page_limits: PageLimits,

    // Bookings
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub admin_email: String,

    /// Optional chatbot flow document overriding the bundled one
    pub chatbot_flow_path: Option<PathBuf>,
}

impl Config {
    // == Presets ==
    /// Defaults for a long-lived process.
    pub fn server() -> Self {
        Self {
            profile: Profile::Server,
            server_port: 3000,
            cache_max_entries: 50,
            sweep: SweepMode::Interval(Duration::from_secs(60)),
            rate_limit_window: Duration::from_secs(15 * 60),
            rate_limit_max_requests: 100,
            trust_proxy: false,
            news_api_key: String::new(),
            news_api_base_url: "https://newsapi.org/v2".to_string(),
            upstream_timeout: Duration::from_secs(10),
            page_limits: PageLimits {
                max_page_size: 100,
                max_page: 10,
            },
            data_dir: PathBuf::from("data"),
            upload_dir: PathBuf::from("uploads"),
            admin_email: "admin@example.com".to_string(),
            chatbot_flow_path: None,
        }
    }

    /// Defaults for per-invocation execution.
    pub fn serverless() -> Self {
        Self {
            profile: Profile::Serverless,
            cache_max_entries: 20,
            sweep: SweepMode::PerRequest,
            rate_limit_max_requests: 200,
            upstream_timeout: Duration::from_secs(8),
            page_limits: PageLimits {
                max_page_size: 50,
                max_page: 5,
            },
            ..Self::server()
        }
    }

    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Server => Self::server(),
            Profile::Serverless => Self::serverless(),
        }
    }

    /// Creates a Config from environment variables.
    ///
    /// `DEPLOYMENT_PROFILE` picks the preset; every other variable, when
    /// set and parsable, overrides the preset value.
    ///
    /// # Environment Variables
    /// - `DEPLOYMENT_PROFILE` - `server` (default) or `serverless`
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity
    /// - `CLEANUP_INTERVAL` - Sweep interval in seconds (server profile only)
    /// - `RATE_LIMIT_WINDOW_SECS` - Governor window length
    /// - `RATE_LIMIT_MAX_REQUESTS` - Requests admitted per window
    /// - `TRUST_PROXY` - `true`/`1` to identify clients by `X-Forwarded-For`
    /// - `NEWS_API_KEY` - Upstream credential
    /// - `NEWS_API_BASE_URL` - Upstream base URL
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream call budget
    /// - `DATA_DIR` - Directory for booking records
    /// - `UPLOAD_DIR` - Directory for uploaded documents
    /// - `ADMIN_EMAIL` - Recipient of booking alerts
    /// - `CHATBOT_FLOW_PATH` - Chatbot flow JSON file
    pub fn from_env() -> Self {
        let profile = env_parse::<Profile>("DEPLOYMENT_PROFILE").unwrap_or(Profile::Server);
        let mut config = Self::for_profile(profile);

        if let Some(port) = env_parse("SERVER_PORT") {
            config.server_port = port;
        }
        if let Some(max) = env_parse("CACHE_MAX_ENTRIES") {
            config.cache_max_entries = max;
        }
        if let (SweepMode::Interval(_), Some(secs)) = (config.sweep, env_parse::<u64>("CLEANUP_INTERVAL")) {
            config.sweep = SweepMode::Interval(Duration::from_secs(secs.max(1)));
        }
        if let Some(secs) = env_parse::<u64>("RATE_LIMIT_WINDOW_SECS") {
            config.rate_limit_window = Duration::from_secs(secs.max(1));
        }
        if let Some(max) = env_parse("RATE_LIMIT_MAX_REQUESTS") {
            config.rate_limit_max_requests = max;
        }
        if let Some(trust) = env_flag("TRUST_PROXY") {
            config.trust_proxy = trust;
        }
        if let Some(key) = env_string("NEWS_API_KEY") {
            config.news_api_key = key;
        }
        if let Some(url) = env_string("NEWS_API_BASE_URL") {
            config.news_api_base_url = url;
        }
        if let Some(secs) = env_parse::<u64>("UPSTREAM_TIMEOUT_SECS") {
            config.upstream_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(dir) = env_string("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_string("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(email) = env_string("ADMIN_EMAIL") {
            config.admin_email = email;
        }
        config.chatbot_flow_path = env_string("CHATBOT_FLOW_PATH").map(PathBuf::from);

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::server()
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    match env_string(name)?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_server_preset() {
        let config = Config::default();
        assert_eq!(config.profile, Profile::Server);
        assert_eq!(config.cache_max_entries, 50);
        assert_eq!(config.sweep, SweepMode::Interval(Duration::from_secs(60)));
        assert_eq!(config.rate_limit_window, Duration::from_secs(900));
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.page_limits.max_page_size, 100);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_serverless_preset() {
        let config = Config::serverless();
        assert_eq!(config.profile, Profile::Serverless);
        assert_eq!(config.sweep, SweepMode::PerRequest);
        assert!(config.cache_max_entries < Config::server().cache_max_entries);
        assert_eq!(config.rate_limit_max_requests, 200);
        assert_eq!(config.upstream_timeout, Duration::from_secs(8));
        assert_eq!(config.page_limits.max_page_size, 50);
        assert_eq!(config.news_api_base_url, "https://newsapi.org/v2");
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("server".parse::<Profile>(), Ok(Profile::Server));
        assert_eq!(" Serverless ".parse::<Profile>(), Ok(Profile::Serverless));
        assert!("cluster".parse::<Profile>().is_err());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "DEPLOYMENT_PROFILE",
            "SERVER_PORT",
            "CACHE_MAX_ENTRIES",
            "CLEANUP_INTERVAL",
            "RATE_LIMIT_WINDOW_SECS",
            "RATE_LIMIT_MAX_REQUESTS",
            "UPSTREAM_TIMEOUT_SECS",
            "TRUST_PROXY",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.profile, Profile::Server);
        assert_eq!(config.cache_max_entries, 50);
        assert_eq!(config.server_port, 3000);
        assert!(!config.trust_proxy);
    }

    #[test]
    fn test_proxy_trust_off_in_both_presets() {
        assert!(!Config::server().trust_proxy);
        assert!(!Config::serverless().trust_proxy);
    }
}
