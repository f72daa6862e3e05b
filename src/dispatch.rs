//! Batch Dispatcher
//!
//! Takes an ordered batch of requests, launches one task per slot through
//! the governor's admission gate, and collects the results into a vector
//! indexed by submission order. Completion order is never observable.
//!
//! When a longtail policy is armed, the dispatcher counts completions;
//! once `ceil(K × percentile)` have landed it starts the wait timer, and on
//! expiry aborts every task still in flight. Aborted slots are filled with
//! synthesized cancellation records. Every slot is always filled: a real
//! response, an engine failure record, or a synthesized cancellation.
//!
//! Dropping the returned future aborts the whole batch (`JoinSet` drop
//! semantics), which is how caller-side cancellation propagates to the
//! in-flight requests and returns their connections to the pool.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tokio::time::Sleep;

use crate::engine::Execute;
use crate::governor;
use crate::longtail::LongtailPolicy;
use crate::types::{Request, Response};

/// Per-slot identity kept for synthesizing records after cancellation.
struct SlotMeta {
    request_id: String,
    url: String,
}

/// Execute `requests` concurrently, at most `max_concurrent` in flight,
/// and return responses at matching indices.
pub(crate) async fn dispatch<E: Execute>(
    engine: Arc<E>,
    requests: Vec<Request>,
    max_concurrent: usize,
    longtail: Option<LongtailPolicy>,
) -> Vec<Response> {
    let batch_len = requests.len();
    if batch_len == 0 {
        return Vec::new();
    }

    let started = Instant::now();
    let threshold = longtail.map(|policy| policy.threshold(batch_len));
    tracing::debug!(
        batch = batch_len,
        concurrency = max_concurrent,
        longtail = longtail.is_some(),
        "dispatching batch"
    );

    let gate = governor::admission_gate(max_concurrent);
    let mut tasks: JoinSet<Response> = JoinSet::new();
    let mut slot_of = HashMap::with_capacity(batch_len);
    let mut meta = Vec::with_capacity(batch_len);

    for (slot, request) in requests.into_iter().enumerate() {
        meta.push(SlotMeta {
            request_id: request.request_id.clone(),
            url: request.url.clone(),
        });
        let engine = Arc::clone(&engine);
        let gate = Arc::clone(&gate);
        let handle = tasks.spawn(async move {
            let _permit = gate
                .acquire_owned()
                .await
                .expect("batch admission gate is never closed");
            engine.execute(request).await
        });
        slot_of.insert(handle.id(), slot);
    }

    let mut slots: Vec<Option<Response>> = vec![None; batch_len];
    let mut completed = 0usize;
    let mut deadline: Option<Pin<Box<Sleep>>> = None;
    let mut fired = false;

    loop {
        let joined = match deadline.as_mut() {
            Some(sleep) if !fired => {
                tokio::select! {
                    joined = tasks.join_next_with_id() => joined,
                    _ = sleep.as_mut() => {
                        tracing::debug!(
                            completed,
                            batch = batch_len,
                            "longtail wait expired, cancelling stragglers"
                        );
                        tasks.abort_all();
                        fired = true;
                        continue;
                    }
                }
            }
            _ => tasks.join_next_with_id().await,
        };
        let Some(joined) = joined else { break };

        match joined {
            Ok((id, response)) => {
                if let Some(&slot) = slot_of.get(&id) {
                    slots[slot] = Some(response);
                }
                completed += 1;
                if let (Some(policy), Some(threshold)) = (longtail, threshold) {
                    if deadline.is_none()
                        && !fired
                        && completed >= threshold
                        && completed < batch_len
                    {
                        tracing::debug!(
                            completed,
                            threshold,
                            wait = ?policy.wait(),
                            "longtail threshold reached, arming timer"
                        );
                        deadline = Some(Box::pin(tokio::time::sleep(policy.wait())));
                    }
                }
            }
            Err(join_error) => {
                if let Some(&slot) = slot_of.get(&join_error.id()) {
                    let elapsed = started.elapsed().as_secs_f64();
                    let SlotMeta { request_id, url } = &meta[slot];
                    slots[slot] = Some(if join_error.is_cancelled() {
                        Response::cancelled(request_id.clone(), url.clone(), elapsed)
                    } else {
                        Response::failure(
                            request_id.clone(),
                            url.clone(),
                            elapsed,
                            format!("request task failed: {join_error}"),
                        )
                    });
                }
            }
        }
    }

    tracing::debug!(
        batch = batch_len,
        completed,
        cancelled = batch_len.saturating_sub(completed),
        elapsed = ?started.elapsed(),
        "batch finished"
    );

    slots
        .into_iter()
        .zip(meta)
        .map(|(slot, m)| {
            slot.unwrap_or_else(|| {
                Response::cancelled(m.request_id, m.url, started.elapsed().as_secs_f64())
            })
        })
        .collect()
}
