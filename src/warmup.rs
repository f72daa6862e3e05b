//! Warmup Subsystem
//!
//! Pre-establishes pooled connections so the first real batch pays no
//! handshake cost. Probes flow through the same engine (and therefore the
//! same pool) as subsequent requests; that shared pool is the subsystem's
//! only correctness contract.
//!
//! The simple form fires N probes and discards every outcome, HTTP
//! failures included. The advanced form round-robins N probes across a
//! list of paths under a base URL and returns one diagnostic record per
//! probe, in probe order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::Execute;
use crate::types::Request;

/// Diagnostics for one warmup probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupReport {
    /// The fully resolved URL the probe hit.
    pub url: String,
    /// HTTP status of the probe, or `0` when it failed before receiving
    /// a status line.
    pub status: u16,
    /// Wall-clock seconds the probe took.
    pub elapsed: f64,
}

/// Fire `num_connections` probes at `url`, discarding all outcomes.
pub(crate) async fn warm<E: Execute>(engine: &Arc<E>, url: &str, num_connections: usize) {
    let _ = warm_advanced(engine, url, &[], num_connections, crate::defaults::warmup::METHOD).await;
}

/// Fire `num_connections` probes round-robined across `paths` under
/// `base_url`, returning per-probe diagnostics in probe order. An empty
/// path list probes `base_url` itself.
pub(crate) async fn warm_advanced<E: Execute>(
    engine: &Arc<E>,
    base_url: &str,
    paths: &[&str],
    num_connections: usize,
    method: &str,
) -> Vec<WarmupReport> {
    let targets: Vec<String> = if paths.is_empty() {
        vec![base_url.to_string()]
    } else {
        paths.iter().map(|path| join_url(base_url, path)).collect()
    };
    tracing::debug!(
        probes = num_connections,
        targets = targets.len(),
        "warming connection pool"
    );

    let probes = (0..num_connections).map(|i| {
        let url = targets[i % targets.len()].clone();
        let engine = Arc::clone(engine);
        let request = Request::new(method, url.clone());
        async move {
            let response = engine.execute(request).await;
            WarmupReport {
                url,
                status: response.status_code,
                elapsed: response.elapsed,
            }
        }
    });
    futures::future::join_all(probes).await
}

/// Join a base URL and a path with exactly one slash between them.
fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Response;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every probe URL and answers with a fixed status.
    struct RecordingEngine {
        status: u16,
        seen: Mutex<Vec<String>>,
    }

    impl RecordingEngine {
        fn new(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Execute for RecordingEngine {
        async fn execute(&self, request: Request) -> Response {
            self.seen.lock().unwrap().push(request.url.clone());
            Response {
                status_code: self.status,
                headers: HashMap::new(),
                content: Bytes::new(),
                url: request.url,
                elapsed: 0.003,
                error: (self.status == 0).then(|| "connect error".to_string()),
                request_id: request.request_id,
            }
        }
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://h.test", "/get"), "https://h.test/get");
        assert_eq!(join_url("https://h.test/", "get"), "https://h.test/get");
        assert_eq!(join_url("https://h.test/", "/get"), "https://h.test/get");
        assert_eq!(join_url("https://h.test", ""), "https://h.test");
    }

    #[tokio::test]
    async fn advanced_returns_one_report_per_probe() {
        let engine = RecordingEngine::new(200);
        let reports = warm_advanced(
            &engine,
            "https://h.test",
            &["/a", "/b", "/c"],
            3,
            "GET",
        )
        .await;

        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert_eq!(report.status, 200);
            assert!(report.elapsed > 0.0);
        }
        let urls: Vec<&str> = reports.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://h.test/a", "https://h.test/b", "https://h.test/c"]
        );
    }

    #[tokio::test]
    async fn probes_round_robin_across_paths() {
        let engine = RecordingEngine::new(200);
        let reports = warm_advanced(&engine, "https://h.test", &["/a", "/b"], 5, "GET").await;

        let urls: Vec<&str> = reports.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://h.test/a",
                "https://h.test/b",
                "https://h.test/a",
                "https://h.test/b",
                "https://h.test/a"
            ]
        );
    }

    #[tokio::test]
    async fn empty_path_list_probes_the_base_url() {
        let engine = RecordingEngine::new(200);
        let reports = warm_advanced(&engine, "https://h.test/", &[], 2, "GET").await;
        assert!(reports.iter().all(|r| r.url == "https://h.test/"));
    }

    #[tokio::test]
    async fn failed_probes_report_status_zero() {
        let engine = RecordingEngine::new(0);
        let reports = warm_advanced(&engine, "https://down.test", &["/x"], 2, "GET").await;
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.status == 0));
    }

    #[tokio::test]
    async fn simple_warmup_swallows_failures() {
        let engine = RecordingEngine::new(0);
        warm(&engine, "https://down.test", 4).await;
        assert_eq!(engine.seen.lock().unwrap().len(), 4);
    }
}
