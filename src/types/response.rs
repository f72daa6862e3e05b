//! Response Record
//!
//! A [`Response`] is the single value a caller receives per request. It is
//! fully materialized (status, lowercased headers, buffered body bytes,
//! elapsed wall-clock seconds) and doubles as the failure carrier:
//! transport errors, timeouts, and longtail cancellations all land here as
//! `status_code = 0` plus an `error` string, so a batch call never fails as
//! a whole.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::longtail::CANCELLED_ERROR;

/// The outcome of one request in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code, or `0` when no status line was received
    /// (transport failure or cancellation).
    pub status_code: u16,
    /// Response headers with lowercased names.
    pub headers: HashMap<String, String>,
    /// The fully buffered response body; empty on failure.
    pub content: Bytes,
    /// The final URL that was fetched.
    pub url: String,
    /// Wall-clock seconds from just before dispatch to completion or
    /// failure.
    pub elapsed: f64,
    /// Human-readable failure description; present iff the request did not
    /// complete an HTTP transaction.
    pub error: Option<String>,
    /// Echo of the request's id.
    pub request_id: String,
}

impl Response {
    /// `true` when the request completed with a 2xx status and no
    /// transport error.
    pub fn ok(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status_code)
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.content).map_err(Error::from)
    }

    /// Escalate this record into an [`Error`]: transport failures become
    /// [`Error::Http`], 4xx/5xx statuses become [`Error::Status`].
    pub fn raise_for_status(&self) -> Result<&Self, Error> {
        if let Some(error) = &self.error {
            return Err(Error::Http(format!(
                "request to {} failed: {error}",
                self.url
            )));
        }
        if self.status_code >= 400 {
            return Err(Error::Status {
                status: self.status_code,
                url: self.url.clone(),
            });
        }
        Ok(self)
    }

    /// A record for a request that produced no HTTP status.
    pub(crate) fn failure(request_id: String, url: String, elapsed: f64, error: String) -> Self {
        Self {
            status_code: 0,
            headers: HashMap::new(),
            content: Bytes::new(),
            url,
            elapsed,
            error: Some(error),
            request_id,
        }
    }

    /// A synthesized record for a request cancelled by the longtail policy.
    pub(crate) fn cancelled(request_id: String, url: String, elapsed: f64) -> Self {
        Self::failure(request_id, url, elapsed, CANCELLED_ERROR.to_string())
    }
}
