//! HTTP Engine
//!
//! The engine wraps a single pooled `reqwest::Client` and executes one
//! fully-specified [`Request`] into one [`Response`] record. Connections
//! are reused across calls for the lifetime of the engine; the pool cap is
//! `max_connections` when configured.
//!
//! `execute` is infallible: every transport, DNS, TLS, connect, read,
//! decode, or timeout failure is captured in the record
//! (`status_code = 0`, `error` set) instead of propagating. The only
//! fallible operation is constructing the engine itself.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::types::Request;
use crate::types::Response;

/// Executes one request into one response record.
///
/// The dispatcher is generic over this seam so tests can substitute an
/// engine that observes scheduling without touching the network.
#[async_trait]
pub(crate) trait Execute: Send + Sync + 'static {
    async fn execute(&self, request: Request) -> Response;
}

/// The pooled HTTP engine backing a [`Client`](crate::Client).
pub(crate) struct HttpEngine {
    http: reqwest::Client,
    default_timeout: std::time::Duration,
}

impl HttpEngine {
    /// Build an engine from configuration.
    pub(crate) fn new(config: &ClientConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone());

        if let Some(max_connections) = config.max_connections {
            builder = builder.pool_max_idle_per_host(max_connections);
        }
        if !config.enable_compression {
            builder = builder.no_gzip().no_brotli();
        }

        let http = builder
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            default_timeout: config.timeout,
        })
    }

    /// Execute one request, producing a record for success and failure
    /// alike.
    pub(crate) async fn perform(&self, request: Request) -> Response {
        let started = Instant::now();
        let url = request.full_url();
        let request_id = request.request_id.clone();
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let method = match Method::from_bytes(request.method.as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                return Response::failure(
                    request_id,
                    url,
                    started.elapsed().as_secs_f64(),
                    format!("invalid HTTP method: {}", request.method),
                );
            }
        };

        let parsed_url = match reqwest::Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Response::failure(
                    request_id,
                    url,
                    started.elapsed().as_secs_f64(),
                    format!("invalid URL: {e}"),
                );
            }
        };

        let mut builder = self.http.request(method, parsed_url).timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match request.encoded_body() {
            Ok(Some(body)) => {
                if let Some(content_type) = body.content_type {
                    if !request.has_header("content-type") {
                        builder = builder.header(CONTENT_TYPE, content_type);
                    }
                }
                builder = builder.body(body.bytes);
            }
            Ok(None) => {}
            Err(message) => {
                return Response::failure(
                    request_id,
                    url,
                    started.elapsed().as_secs_f64(),
                    message,
                );
            }
        }

        tracing::trace!(method = %request.method, %url, "executing request");

        match builder.send().await {
            Ok(response) => {
                let status_code = response.status().as_u16();
                let final_url = response.url().to_string();
                let headers = header_map(response.headers());
                match response.bytes().await {
                    Ok(content) => Response {
                        status_code,
                        headers,
                        content,
                        url: final_url,
                        elapsed: started.elapsed().as_secs_f64(),
                        error: None,
                        request_id,
                    },
                    Err(e) => {
                        tracing::warn!(url = %final_url, error = %e, "failed to read response body");
                        Response::failure(
                            request_id,
                            final_url,
                            started.elapsed().as_secs_f64(),
                            describe(&e, timeout),
                        )
                    }
                }
            }
            Err(e) => Response::failure(
                request_id,
                url,
                started.elapsed().as_secs_f64(),
                describe(&e, timeout),
            ),
        }
    }
}

#[async_trait]
impl Execute for HttpEngine {
    async fn execute(&self, request: Request) -> Response {
        self.perform(request).await
    }
}

/// Lowercased header name → value map.
fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).to_string(),
            )
        })
        .collect()
}

/// A concise description of a transport failure, with the error source
/// chain flattened. Timeouts get a dedicated text so callers can tell them
/// apart from longtail cancellation.
fn describe(err: &reqwest::Error, timeout: std::time::Duration) -> String {
    if err.is_timeout() {
        return format!("request timed out after {:.1}s", timeout.as_secs_f64());
    }
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine() -> HttpEngine {
        HttpEngine::new(&ClientConfig::default()).unwrap()
    }

    #[test]
    fn builds_from_default_config() {
        assert!(HttpEngine::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn builds_with_pool_cap_and_compression() {
        let config = ClientConfig::builder()
            .max_connections(8)
            .enable_compression(true)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert!(HttpEngine::new(&config).is_ok());
    }

    #[tokio::test]
    async fn invalid_url_becomes_a_failure_record() {
        let response = engine().perform(Request::get("not a url")).await;
        assert_eq!(response.status_code, 0);
        assert!(response.error.unwrap().contains("invalid URL"));
    }

    #[tokio::test]
    async fn invalid_method_becomes_a_failure_record() {
        let response = engine()
            .perform(Request::new("NOT A METHOD", "https://example.com"))
            .await;
        assert_eq!(response.status_code, 0);
        assert!(response.error.unwrap().contains("invalid HTTP method"));
    }

    #[tokio::test]
    async fn failure_records_echo_the_request_id() {
        let request = Request::get("not a url").request_id("req-42");
        let response = engine().perform(request).await;
        assert_eq!(response.request_id, "req-42");
    }
}
