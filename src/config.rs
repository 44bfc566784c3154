//! Monitor configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparsable values fall back
//! to the defaults documented on each field.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

use crate::domain::{DEFAULT_EVENT_LIMIT, DEFAULT_FEED_CAPACITY, MAX_FEED_CAPACITY};
use crate::generator::DEFAULT_SENDER;
use crate::service::{DEFAULT_BROKER_URL, MonitorSettings};

/// Longest accepted task period: one day.
pub const MAX_INTERVAL_MS: u64 = 86_400_000;

/// Largest accepted EventBus capacity.
pub const MAX_EVENT_BUS_CAPACITY: usize = 1_000_000;

/// Longest accepted per-request timeout: one hour.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 3_600;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level monitor configuration.
///
/// Loaded once at startup via [`MonitorConfig::from_env`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Socket address to bind the HTTP server to (default `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Milliseconds between generation ticks (default 3000).
    pub generate_interval_ms: u64,

    /// Milliseconds between metrics recomputations (default 2000).
    pub metrics_interval_ms: u64,

    /// Milliseconds between system log entries (default 2000).
    pub log_interval_ms: u64,

    /// Capacity of each rolling feed (default 50).
    pub feed_capacity: usize,

    /// Events returned when a request omits `limit` (default 100).
    pub events_default_limit: usize,

    /// Capacity of the EventBus broadcast channel (default 10 000).
    pub event_bus_capacity: usize,

    /// Seed for the mock generator; `None` seeds from the OS.
    pub generator_seed: Option<u64>,

    /// Address the simulated broker reports (default `ws://localhost:8080`).
    pub broker_url: String,

    /// Whether the simulated broker connects at startup (default true).
    pub broker_enabled: bool,

    /// API key for the email provider, if any.
    pub email_provider_api_key: Option<String>,

    /// Sender address of generated and sent emails.
    pub email_from_address: String,

    /// Whether the system log stream starts running (default true).
    pub log_stream_enabled: bool,

    /// Per-request timeout in seconds (default 30).
    pub request_timeout_secs: u64,

    /// Tracing output format (default text).
    pub log_format: LogFormat,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            generate_interval_ms: 3_000,
            metrics_interval_ms: 2_000,
            log_interval_ms: 2_000,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            events_default_limit: DEFAULT_EVENT_LIMIT,
            event_bus_capacity: 10_000,
            generator_seed: None,
            broker_url: DEFAULT_BROKER_URL.to_string(),
            broker_enabled: true,
            email_provider_api_key: None,
            email_from_address: DEFAULT_SENDER.to_string(),
            log_stream_enabled: true,
            request_timeout_secs: 30,
            log_format: LogFormat::Text,
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    /// Values are clamped by [`MonitorConfig::normalized`].
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid LISTEN_ADDR: {raw}"))?,
            Err(_) => defaults.listen_addr,
        };

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let config = Self {
            listen_addr,
            generate_interval_ms: parse_env("GENERATE_INTERVAL_MS", defaults.generate_interval_ms),
            metrics_interval_ms: parse_env("METRICS_INTERVAL_MS", defaults.metrics_interval_ms),
            log_interval_ms: parse_env("LOG_INTERVAL_MS", defaults.log_interval_ms),
            feed_capacity: parse_env("FEED_CAPACITY", defaults.feed_capacity),
            events_default_limit: parse_env("EVENTS_DEFAULT_LIMIT", defaults.events_default_limit),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            generator_seed: std::env::var("GENERATOR_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
            broker_url: std::env::var("BROKER_URL").unwrap_or(defaults.broker_url),
            broker_enabled: parse_env_bool("BROKER_ENABLED", defaults.broker_enabled),
            email_provider_api_key: std::env::var("EMAIL_PROVIDER_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            email_from_address: std::env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or(defaults.email_from_address),
            log_stream_enabled: parse_env_bool("LOG_STREAM_ENABLED", defaults.log_stream_enabled),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            log_format,
        };

        Ok(config.normalized())
    }

    /// Clamps every interval, capacity and timeout into its allowed range.
    ///
    /// Zero values are raised to 1. Feed capacity is capped at
    /// [`MAX_FEED_CAPACITY`], the event bus at [`MAX_EVENT_BUS_CAPACITY`],
    /// intervals at [`MAX_INTERVAL_MS`] and the request timeout at
    /// [`MAX_REQUEST_TIMEOUT_SECS`].
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.generate_interval_ms = self.generate_interval_ms.clamp(1, MAX_INTERVAL_MS);
        self.metrics_interval_ms = self.metrics_interval_ms.clamp(1, MAX_INTERVAL_MS);
        self.log_interval_ms = self.log_interval_ms.clamp(1, MAX_INTERVAL_MS);
        self.feed_capacity = self.feed_capacity.clamp(1, MAX_FEED_CAPACITY);
        self.events_default_limit = self.events_default_limit.max(1);
        self.event_bus_capacity = self.event_bus_capacity.clamp(1, MAX_EVENT_BUS_CAPACITY);
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, MAX_REQUEST_TIMEOUT_SECS);
        self
    }

    /// Period of the generation task.
    #[must_use]
    pub fn generate_interval(&self) -> Duration {
        Duration::from_millis(self.generate_interval_ms)
    }

    /// Period of the metrics task.
    #[must_use]
    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }

    /// Period of the system log task.
    #[must_use]
    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Service sizing derived from this configuration.
    #[must_use]
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            feed_capacity: self.feed_capacity,
            events_default_limit: self.events_default_limit,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_cadence() {
        let config = MonitorConfig::default();
        assert_eq!(config.generate_interval(), Duration::from_secs(3));
        assert_eq!(config.metrics_interval(), Duration::from_secs(2));
        assert_eq!(config.feed_capacity, 50);
        assert_eq!(config.monitor_settings().events_default_limit, 100);
        assert_eq!(config.email_from_address, "noreply@trackingsystem.com");
    }

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let config = MonitorConfig {
            generate_interval_ms: 0,
            metrics_interval_ms: u64::MAX,
            feed_capacity: usize::MAX,
            event_bus_capacity: usize::MAX,
            events_default_limit: 0,
            request_timeout_secs: u64::MAX,
            ..MonitorConfig::default()
        }
        .normalized();

        assert_eq!(config.generate_interval_ms, 1);
        assert_eq!(config.metrics_interval_ms, MAX_INTERVAL_MS);
        assert_eq!(config.feed_capacity, MAX_FEED_CAPACITY);
        assert_eq!(config.monitor_settings().feed_capacity, 1_000);
        assert_eq!(config.event_bus_capacity, MAX_EVENT_BUS_CAPACITY);
        assert_eq!(config.events_default_limit, 1);
        assert_eq!(config.request_timeout(), Duration::from_secs(3_600));
    }

    #[test]
    fn normalized_keeps_defaults() {
        let config = MonitorConfig::default().normalized();
        assert_eq!(config.feed_capacity, 50);
        assert_eq!(config.event_bus_capacity, 10_000);
        assert_eq!(config.generate_interval(), Duration::from_secs(3));
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        assert_eq!(parse_env("TRACKING_MONITOR_TEST_UNSET_KEY", 17u64), 17);
        assert!(parse_env_bool("TRACKING_MONITOR_TEST_UNSET_KEY", true));
    }
}
