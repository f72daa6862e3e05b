//! Client Configuration
//!
//! This module defines [`ClientConfig`] and its builder, used to configure
//! the pooled HTTP engine and the optional longtail cancellation policy.
//!
//! Construction is the only place volley rejects input: the builder
//! validates pool size, timeouts, and the longtail invariant (both of
//! `longtail_percentile` / `longtail_wait`, or neither).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::Error;
use crate::longtail::LongtailPolicy;

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Upper bound on pooled connections per host. When absent, the pool is
    /// effectively unbounded and the concurrency governor sizes itself
    /// adaptively from the batch.
    pub max_connections: Option<usize>,
    /// Default per-request timeout; individual requests may override it.
    pub timeout: Duration,
    /// Connection timeout for establishing new connections.
    pub connect_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Whether to negotiate compressed responses (gzip, brotli) and
    /// transparently decompress them.
    pub enable_compression: bool,
    /// Optional longtail cancellation policy applied to every batch.
    pub longtail: Option<LongtailPolicy>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_connections: None,
            timeout: defaults::http::REQUEST_TIMEOUT,
            connect_timeout: defaults::http::CONNECT_TIMEOUT,
            user_agent: defaults::http::USER_AGENT.to_string(),
            enable_compression: false,
            longtail: None,
        }
    }
}

impl ClientConfig {
    /// Returns a builder for constructing `ClientConfig`
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`] with construction-time validation.
///
/// `longtail_percentile` and `longtail_wait` are independent setters so the
/// both-or-neither invariant is checked in [`build`](Self::build) rather
/// than silently absorbed.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    max_connections: Option<usize>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    enable_compression: Option<bool>,
    longtail_percentile: Option<f64>,
    longtail_wait: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of pooled connections per host.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// Default per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Connection establishment timeout.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    /// User agent sent with every request.
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Negotiate and decompress gzip/brotli response bodies.
    pub fn enable_compression(mut self, enable_compression: bool) -> Self {
        self.enable_compression = Some(enable_compression);
        self
    }

    /// Completion fraction that arms the longtail timer. Must be set
    /// together with [`longtail_wait`](Self::longtail_wait).
    pub fn longtail_percentile(mut self, percentile: f64) -> Self {
        self.longtail_percentile = Some(percentile);
        self
    }

    /// How long to wait after the threshold before cancelling stragglers.
    /// Must be set together with
    /// [`longtail_percentile`](Self::longtail_percentile).
    pub fn longtail_wait(mut self, wait: Duration) -> Self {
        self.longtail_wait = Some(wait);
        self
    }

    /// Build the configuration, validating every invariant.
    pub fn build(self) -> Result<ClientConfig, Error> {
        if let Some(max_connections) = self.max_connections {
            if max_connections == 0 {
                return Err(Error::Configuration(
                    "max_connections must be positive".to_string(),
                ));
            }
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(Error::Configuration("timeout must be positive".to_string()));
            }
        }

        let longtail = match (self.longtail_percentile, self.longtail_wait) {
            (None, None) => None,
            (Some(percentile), Some(wait)) => Some(LongtailPolicy::new(percentile, wait)?),
            _ => {
                return Err(Error::Configuration(
                    "Both longtail_percentile and longtail_wait must be set together".to_string(),
                ));
            }
        };

        let base = ClientConfig::default();
        Ok(ClientConfig {
            max_connections: self.max_connections,
            timeout: self.timeout.unwrap_or(base.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(base.connect_timeout),
            user_agent: self.user_agent.unwrap_or(base.user_agent),
            enable_compression: self.enable_compression.unwrap_or(base.enable_compression),
            longtail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_connections, None);
        assert!(!config.enable_compression);
        assert!(config.longtail.is_none());
    }

    #[test]
    fn builder_sets_all_fields() {
        let config = ClientConfig::builder()
            .max_connections(32)
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .user_agent("test-agent/1.0")
            .enable_compression(true)
            .longtail_percentile(0.9)
            .longtail_wait(Duration::from_millis(250))
            .build()
            .unwrap();

        assert_eq!(config.max_connections, Some(32));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert!(config.enable_compression);
        let longtail = config.longtail.unwrap();
        assert_eq!(longtail.percentile(), 0.9);
        assert_eq!(longtail.wait(), Duration::from_millis(250));
    }

    #[test]
    fn longtail_requires_both_fields() {
        let err = ClientConfig::builder()
            .longtail_percentile(0.8)
            .build()
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("longtail_percentile"));
        assert!(message.contains("longtail_wait"));
        assert!(message.contains("must be set together"));

        let err = ClientConfig::builder()
            .longtail_wait(Duration::from_secs(1))
            .build()
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("longtail_percentile"));
        assert!(message.contains("longtail_wait"));
    }

    #[test]
    fn longtail_percentile_range_is_validated() {
        for bad in [1.5, -0.1, 0.0] {
            let err = ClientConfig::builder()
                .longtail_percentile(bad)
                .longtail_wait(Duration::from_secs(1))
                .build()
                .unwrap_err();
            assert!(err.to_string().contains("between 0.0 and 1.0"));
        }
    }

    #[test]
    fn zero_max_connections_is_rejected() {
        let err = ClientConfig::builder().max_connections(0).build().unwrap_err();
        assert!(err.to_string().contains("max_connections"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::builder()
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }
}
