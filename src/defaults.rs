//! Default Configuration Values
//!
//! This module centralizes all default values used throughout volley.
//! Having defaults in one place makes them easier to maintain, document,
//! and adjust.

use std::time::Duration;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default per-request timeout.
    ///
    /// Set to 60 seconds to accommodate slow origins and large bodies,
    /// plus network latency and proxy delays.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Default connection timeout for establishing HTTP connections
    ///
    /// Set to 10 seconds which is sufficient for most network conditions
    /// while not being too aggressive.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("volley/", env!("CARGO_PKG_VERSION"));
}

/// Concurrency defaults for batch dispatch
pub mod concurrency {
    /// Ceiling for the adaptive concurrency cap.
    ///
    /// When neither a per-call `max_concurrent` nor a client-level
    /// `max_connections` is set, a batch runs at most
    /// `min(batch_size, ADAPTIVE_CEILING)` requests in flight. The ceiling
    /// keeps huge batches from oversubscribing a single origin while still
    /// amortizing connection reuse.
    pub const ADAPTIVE_CEILING: usize = 100;
}

/// Warmup defaults
pub mod warmup {
    /// Default number of probe connections for a warmup call
    pub const NUM_CONNECTIONS: usize = 1;

    /// Default HTTP method for warmup probes
    pub const METHOD: &str = "GET";
}
