//! # Volley - Batched Parallel HTTP Requests
//!
//! Volley is a high-throughput batch HTTP client: hand it an ordered list
//! of independent requests and it executes them concurrently over a
//! shared, warm connection pool, returning one response per request in the
//! same positional order.
//!
#![deny(unsafe_code)]
//!
//! ## Features
//!
//! - **Positional batches**: `Vec<Request>` in, `Vec<Response>` out, index
//!   for index, regardless of completion order.
//! - **Warm pool**: one pooled transport per client; warmup probes
//!   pre-establish connections so the first real batch pays no handshake
//!   cost.
//! - **Concurrency governor**: the inflight cap derives from the per-call
//!   override, the pool size, or an adaptive default, and is enforced by a
//!   counting gate.
//! - **Longtail cancellation**: optionally cancel the slowest stragglers a
//!   fixed wait after a configurable fraction of the batch has completed,
//!   trading completeness for predictable latency.
//! - **Errors as records**: transport failures, timeouts, and
//!   cancellations are captured per slot (`status_code == 0` plus an
//!   `error` string); a batch call never fails as a whole.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volley::Request;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), volley::Error> {
//!     let requests = vec![
//!         Request::get("https://api.example.com/items").param("page", "1"),
//!         Request::get("https://api.example.com/items").param("page", "2"),
//!         Request::post("https://api.example.com/report")
//!             .json(serde_json::json!({"test": "data"})),
//!     ];
//!
//!     let responses = volley::request(requests).await?;
//!     for response in &responses {
//!         if response.ok() {
//!             println!("{} <- {}", response.status_code, response.url);
//!         } else {
//!             println!("failed: {:?}", response.error);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Bounding tail latency
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use volley::{Client, ClientConfig, Request};
//!
//! # async fn run() -> Result<(), volley::Error> {
//! let client = Client::new(
//!     ClientConfig::builder()
//!         .longtail_percentile(0.9)
//!         .longtail_wait(Duration::from_millis(500))
//!         .build()?,
//! )?;
//!
//! // Once 90% of the batch has completed, stragglers get 500ms more and
//! // are then cancelled; their slots report an error containing
//! // "cancelled".
//! let responses = client
//!     .request((0..100).map(|i| Request::get(format!("https://api.example.com/items/{i}"))).collect())
//!     .await;
//! assert_eq!(responses.len(), 100);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod dispatch;
mod engine;
mod error;
mod governor;
mod longtail;
mod types;
mod warmup;

pub mod defaults;

pub use client::{BatchOptions, Client, request, request_with, warmup, warmup_advanced};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::Error;
pub use longtail::LongtailPolicy;
pub use types::{Request, RequestBody, Response};
pub use warmup::WarmupReport;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::{
        BatchOptions, Client, ClientConfig, Error, LongtailPolicy, Request, RequestBody, Response,
        WarmupReport, request, request_with, warmup, warmup_advanced,
    };
}
