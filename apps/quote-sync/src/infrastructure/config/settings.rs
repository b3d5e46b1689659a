//! Client Configuration Settings
//!
//! Configuration types for the quote sync client, loaded from environment
//! variables.

use std::time::Duration;

use crate::application::services::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_RECONNECT_DELAY, LiveFeedConfig, ReconnectConfig,
};
use crate::domain::quotes::RequestedCount;
use crate::infrastructure::snapshot::SNAPSHOT_PATH;
use crate::infrastructure::websocket::FEED_PATH;

/// Default quote service host.
pub const DEFAULT_HOST: &str = "http://localhost:3001";

/// Upstream quote service endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    /// HTTP base URL, e.g. `http://localhost:3001`.
    pub host: String,
    /// Full push channel URL, e.g. `ws://localhost:3001/ws`.
    pub feed_url: String,
    /// Timeout for the snapshot request.
    pub http_timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            feed_url: format!("ws://localhost:3001{FEED_PATH}"),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl UpstreamSettings {
    /// Snapshot endpoint URL without the query string.
    #[must_use]
    pub fn snapshot_url(&self) -> String {
        format!("{}{SNAPSHOT_PATH}", self.host.trim_end_matches('/'))
    }
}

/// Push channel settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Fixed wait between a close and the next attempt.
    pub reconnect_delay: Duration,
    /// Capacity of the diagnostic event channel.
    pub event_capacity: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl From<&FeedSettings> for LiveFeedConfig {
    fn from(settings: &FeedSettings) -> Self {
        Self {
            reconnect: ReconnectConfig::new(settings.reconnect_delay),
            event_capacity: settings.event_capacity,
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upstream endpoints.
    pub upstream: UpstreamSettings,
    /// Push channel settings.
    pub feed: FeedSettings,
    /// Count requested at startup.
    pub initial_count: RequestedCount,
    /// Status server port (0 = disabled).
    pub status_port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamSettings::default(),
            feed: FeedSettings::default(),
            initial_count: RequestedCount::default(),
            status_port: 0,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("QUOTE_SYNC_HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host.trim().trim_end_matches('/').to_string();

        let feed_url = match lookup("QUOTE_SYNC_WS_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("ws://") || url.starts_with("wss://")) {
                    return Err(ConfigError::InvalidUrl {
                        key: "QUOTE_SYNC_WS_URL".to_string(),
                        value: url,
                    });
                }
                url
            }
            None => derive_feed_url(&host)?,
        };

        let upstream = UpstreamSettings {
            host,
            feed_url,
            http_timeout: parse_duration_secs(
                &lookup,
                "QUOTE_SYNC_HTTP_TIMEOUT_SECS",
                defaults.upstream.http_timeout,
            ),
        };

        let feed = FeedSettings {
            reconnect_delay: parse_duration_millis(
                &lookup,
                "QUOTE_SYNC_RECONNECT_DELAY_MS",
                defaults.feed.reconnect_delay,
            ),
            event_capacity: parse_or(
                &lookup,
                "QUOTE_SYNC_EVENT_CAPACITY",
                defaults.feed.event_capacity,
            ),
        };

        let initial_count = lookup("QUOTE_SYNC_COUNT")
            .and_then(|v| RequestedCount::parse_clamped(&v))
            .unwrap_or(defaults.initial_count);

        Ok(Self {
            upstream,
            feed,
            initial_count,
            status_port: parse_or(&lookup, "QUOTE_SYNC_STATUS_PORT", defaults.status_port),
        })
    }
}

/// Turn `http(s)://host` into `ws(s)://host/ws`.
fn derive_feed_url(host: &str) -> Result<String, ConfigError> {
    let rest = if let Some(rest) = host.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = host.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(ConfigError::InvalidUrl {
            key: "QUOTE_SYNC_HOST".to_string(),
            value: host.to_string(),
        });
    };

    Ok(format!("{rest}{FEED_PATH}"))
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// URL has an unsupported scheme or is otherwise unusable.
    #[error("invalid URL in {key}: {value}")]
    InvalidUrl {
        /// Environment variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

/// Zero falls back to the default, like an unparsable value.
fn parse_duration_millis<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .map_or(default, Duration::from_millis)
}
