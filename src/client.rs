//! Client and Convenience API
//!
//! [`Client`] pairs a pooled HTTP engine with its configuration; batches
//! submitted to the same client share the engine's warm connection pool.
//!
//! The module-level functions ([`request`], [`warmup`],
//! [`warmup_advanced`]) route through a lazily constructed process-wide
//! client so unrelated call sites amortize one pool. [`request_with`]
//! accepts [`BatchOptions`] for per-call concurrency and longtail
//! settings; options the global client cannot honor (longtail, or
//! `use_global_client(false)`) transparently build a dedicated client.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::config::ClientConfig;
use crate::dispatch;
use crate::engine::HttpEngine;
use crate::error::Error;
use crate::governor;
use crate::types::{Request, Response};
use crate::warmup::{self, WarmupReport};

/// A parallel HTTP client with a shared connection pool.
#[derive(Clone)]
pub struct Client {
    engine: Arc<HttpEngine>,
    config: ClientConfig,
}

impl Client {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let engine = Arc::new(HttpEngine::new(&config)?);
        tracing::debug!(
            max_connections = ?config.max_connections,
            timeout = ?config.timeout,
            compression = config.enable_compression,
            longtail = config.longtail.is_some(),
            "client created"
        );
        Ok(Self { engine, config })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns a builder for the client's configuration.
    pub fn builder() -> crate::config::ClientConfigBuilder {
        ClientConfig::builder()
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a batch of requests concurrently.
    ///
    /// Returns one response per request, at the same index. Individual
    /// failures are captured inside the records; the call itself never
    /// fails.
    pub async fn request(&self, requests: Vec<Request>) -> Vec<Response> {
        let cap = governor::effective_concurrency(
            requests.len(),
            None,
            self.config.max_connections,
        );
        dispatch::dispatch(
            Arc::clone(&self.engine),
            requests,
            cap,
            self.config.longtail,
        )
        .await
    }

    /// Execute a batch with an explicit inflight cap, overriding the
    /// client's pool-derived default.
    pub async fn request_with_concurrency(
        &self,
        requests: Vec<Request>,
        max_concurrent: usize,
    ) -> Vec<Response> {
        let cap = governor::effective_concurrency(
            requests.len(),
            Some(max_concurrent),
            self.config.max_connections,
        );
        dispatch::dispatch(
            Arc::clone(&self.engine),
            requests,
            cap,
            self.config.longtail,
        )
        .await
    }

    /// Pre-establish `num_connections` pooled connections to `url`,
    /// discarding probe outcomes.
    pub async fn warmup(&self, url: &str, num_connections: usize) {
        warmup::warm(&self.engine, url, num_connections).await;
    }

    /// Pre-establish `num_connections` pooled connections, round-robined
    /// across `paths` under `base_url`, returning per-probe diagnostics.
    pub async fn warmup_advanced(
        &self,
        base_url: &str,
        paths: &[&str],
        num_connections: usize,
        method: &str,
    ) -> Vec<WarmupReport> {
        warmup::warm_advanced(&self.engine, base_url, paths, num_connections, method).await
    }
}

/// The process-wide shared client used by the module-level API.
static GLOBAL_CLIENT: OnceCell<Client> = OnceCell::new();

/// The lazily constructed global client. Lives for the rest of the
/// process once built.
pub(crate) fn global_client() -> Result<&'static Client, Error> {
    GLOBAL_CLIENT.get_or_try_init(|| Client::new(ClientConfig::default()))
}

/// Per-call options for the module-level [`request_with`] entry point.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    use_global_client: bool,
    max_concurrent: Option<usize>,
    longtail_percentile: Option<f64>,
    longtail_wait: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            use_global_client: true,
            max_concurrent: None,
            longtail_percentile: None,
            longtail_wait: None,
        }
    }
}

impl BatchOptions {
    /// Create options with defaults (global client, adaptive concurrency,
    /// no longtail).
    pub fn new() -> Self {
        Self::default()
    }

    /// Route through the process-wide client (default) or a dedicated one.
    pub fn use_global_client(mut self, use_global_client: bool) -> Self {
        self.use_global_client = use_global_client;
        self
    }

    /// Cap on simultaneously in-flight requests for this batch.
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = Some(max_concurrent);
        self
    }

    /// Longtail completion fraction; must be set together with
    /// [`longtail_wait`](Self::longtail_wait).
    pub fn longtail_percentile(mut self, percentile: f64) -> Self {
        self.longtail_percentile = Some(percentile);
        self
    }

    /// Longtail wait after the threshold; must be set together with
    /// [`longtail_percentile`](Self::longtail_percentile).
    pub fn longtail_wait(mut self, wait: Duration) -> Self {
        self.longtail_wait = Some(wait);
        self
    }

    fn wants_dedicated_client(&self) -> bool {
        !self.use_global_client
            || self.longtail_percentile.is_some()
            || self.longtail_wait.is_some()
    }

    fn into_config(self) -> Result<ClientConfig, Error> {
        let mut builder = ClientConfig::builder();
        if let Some(percentile) = self.longtail_percentile {
            builder = builder.longtail_percentile(percentile);
        }
        if let Some(wait) = self.longtail_wait {
            builder = builder.longtail_wait(wait);
        }
        builder.build()
    }
}

/// Execute a batch through the process-wide client.
///
/// Returns one response per request, at the same index; individual
/// failures are captured inside the records. The only error this function
/// returns is a failure to construct the global client.
pub async fn request(requests: Vec<Request>) -> Result<Vec<Response>, Error> {
    Ok(global_client()?.request(requests).await)
}

/// Execute a batch with per-call [`BatchOptions`].
pub async fn request_with(
    requests: Vec<Request>,
    options: BatchOptions,
) -> Result<Vec<Response>, Error> {
    let max_concurrent = options.max_concurrent;
    if options.wants_dedicated_client() {
        let client = Client::new(options.into_config()?)?;
        return Ok(match max_concurrent {
            Some(limit) => client.request_with_concurrency(requests, limit).await,
            None => client.request(requests).await,
        });
    }
    let client = global_client()?;
    Ok(match max_concurrent {
        Some(limit) => client.request_with_concurrency(requests, limit).await,
        None => client.request(requests).await,
    })
}

/// Warm the global client's connection pool with `num_connections` probes
/// to `url`.
pub async fn warmup(url: &str, num_connections: usize) -> Result<(), Error> {
    global_client()?.warmup(url, num_connections).await;
    Ok(())
}

/// Warm the global client's pool with probes round-robined across `paths`
/// under `base_url`, returning per-probe diagnostics.
pub async fn warmup_advanced(
    base_url: &str,
    paths: &[&str],
    num_connections: usize,
    method: &str,
) -> Result<Vec<WarmupReport>, Error> {
    Ok(global_client()?
        .warmup_advanced(base_url, paths, num_connections, method)
        .await)
}
