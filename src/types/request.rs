//! Request Descriptor
//!
//! A [`Request`] is a plain value describing one HTTP transaction: URL,
//! method, headers, query params, optional body, optional timeout, and a
//! stable request id echoed on the response. It is immutable once
//! submitted to a batch; normalization (query appending, body encoding)
//! happens on the way into the engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The body of a request. The variants are mutually exclusive by
/// construction: a request carries JSON *or* raw bytes, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestBody {
    /// A JSON value, serialized with `serde_json` and sent with
    /// `Content-Type: application/json` unless the caller set a
    /// content-type header.
    Json(serde_json::Value),
    /// UTF-8 text, transmitted as its bytes.
    Text(String),
    /// Raw bytes, passed through untouched.
    Bytes(Vec<u8>),
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// An encoded body ready for transmission.
pub(crate) struct EncodedBody {
    pub bytes: Vec<u8>,
    /// Content type to add when the caller did not set one.
    pub content_type: Option<&'static str>,
}

/// One fully-specified HTTP request in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Absolute http/https URL.
    pub url: String,
    /// Uppercase method token, `GET` by default.
    pub method: String,
    /// Header pairs, transmitted in insertion order.
    pub headers: Vec<(String, String)>,
    /// Query parameter pairs appended to the URL. Repeated keys express
    /// list values.
    pub params: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<RequestBody>,
    /// Per-request timeout overriding the client default.
    pub timeout: Option<Duration>,
    /// Opaque id echoed verbatim on the response. Auto-generated (UUIDv4)
    /// at construction, so resubmitting the same value reuses the same id.
    pub request_id: String,
}

impl Request {
    /// Create a request with an explicit method.
    pub fn new<M: Into<String>, U: Into<String>>(method: M, url: U) -> Self {
        Self {
            url: url.into(),
            method: method.into().to_ascii_uppercase(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            timeout: None,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a `GET` request.
    pub fn get<U: Into<String>>(url: U) -> Self {
        Self::new("GET", url)
    }

    /// Create a `POST` request.
    pub fn post<U: Into<String>>(url: U) -> Self {
        Self::new("POST", url)
    }

    /// Add one header pair.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add one query parameter pair. Call repeatedly with the same key for
    /// list values.
    pub fn param<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Set a text or byte body.
    pub fn body<B: Into<RequestBody>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Override the client's default timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the auto-generated request id.
    pub fn request_id<S: Into<String>>(mut self, request_id: S) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// The URL with query params appended, percent-encoded, repeated keys
    /// preserved in insertion order.
    pub(crate) fn full_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let mut query = String::new();
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                query.push('&');
            }
            query.push_str(&urlencoding::encode(name));
            query.push('=');
            query.push_str(&urlencoding::encode(value));
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }

    /// Whether the caller set the given header (case-insensitive).
    pub(crate) fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(header, _)| header.eq_ignore_ascii_case(name))
    }

    /// Encode the body for transmission.
    pub(crate) fn encoded_body(&self) -> Result<Option<EncodedBody>, String> {
        match &self.body {
            None => Ok(None),
            Some(RequestBody::Json(value)) => serde_json::to_vec(value)
                .map(|bytes| {
                    Some(EncodedBody {
                        bytes,
                        content_type: Some("application/json"),
                    })
                })
                .map_err(|e| format!("failed to encode JSON body: {e}")),
            Some(RequestBody::Text(text)) => Ok(Some(EncodedBody {
                bytes: text.clone().into_bytes(),
                content_type: None,
            })),
            Some(RequestBody::Bytes(bytes)) => Ok(Some(EncodedBody {
                bytes: bytes.clone(),
                content_type: None,
            })),
        }
    }
}
