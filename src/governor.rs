//! Concurrency Governor
//!
//! Derives the effective inflight cap for a batch and enforces it with a
//! counting semaphore. The cap resolution order is: per-call override,
//! then the client's `max_connections`, then an adaptive default of
//! `min(batch_size, ADAPTIVE_CEILING)`. The result is always at least 1.
//!
//! The semaphore is the sole admission gate: every per-request task holds
//! one permit for the duration of its engine call, so the number of
//! requests inside the engine never exceeds the cap.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::defaults;

/// Resolve the effective concurrency cap for a batch.
pub(crate) fn effective_concurrency(
    batch_len: usize,
    max_concurrent: Option<usize>,
    max_connections: Option<usize>,
) -> usize {
    let cap = max_concurrent
        .or(max_connections)
        .unwrap_or_else(|| batch_len.min(defaults::concurrency::ADAPTIVE_CEILING));
    cap.max(1)
}

/// A counting gate sized to the effective cap.
pub(crate) fn admission_gate(cap: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_call_override_wins() {
        assert_eq!(effective_concurrency(1000, Some(7), Some(50)), 7);
    }

    #[test]
    fn pool_cap_applies_without_override() {
        assert_eq!(effective_concurrency(1000, None, Some(50)), 50);
    }

    #[test]
    fn adaptive_default_tracks_small_batches() {
        assert_eq!(effective_concurrency(3, None, None), 3);
        assert_eq!(effective_concurrency(42, None, None), 42);
    }

    #[test]
    fn adaptive_default_is_capped() {
        assert_eq!(
            effective_concurrency(10_000, None, None),
            defaults::concurrency::ADAPTIVE_CEILING
        );
    }

    #[test]
    fn cap_is_never_zero() {
        assert_eq!(effective_concurrency(0, None, None), 1);
        assert_eq!(effective_concurrency(5, Some(0), None), 1);
    }

    #[test]
    fn gate_holds_exactly_cap_permits() {
        let gate = admission_gate(3);
        assert_eq!(gate.available_permits(), 3);
    }
}
