//! Longtail Cancellation Policy
//!
//! In a large batch a small minority of requests is often much slower than
//! the rest and dominates overall latency. A [`LongtailPolicy`] bounds that
//! tail: once `ceil(K × percentile)` of the K requests have completed, a
//! timer of `wait` starts; when it expires, every request still in flight
//! is cancelled and its slot is filled with a synthesized response whose
//! `error` contains `"cancelled"`.
//!
//! The threshold is a completion *count*, never a wall-clock heuristic: the
//! timer cannot start before the count is reached, and if the whole batch
//! finishes first the timer is disarmed and nothing is cancelled.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Error text written into synthesized cancellation records.
///
/// The substring `"cancelled"` is a stable contract; callers match on it
/// (case-insensitively) to distinguish longtail cancellation from transport
/// failures and timeouts.
pub(crate) const CANCELLED_ERROR: &str = "request cancelled by longtail policy";

/// A validated longtail cancellation policy: cancel stragglers `wait` after
/// a `percentile` fraction of the batch has completed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongtailPolicy {
    percentile: f64,
    wait: Duration,
}

impl LongtailPolicy {
    /// Create a policy, validating that `percentile` is in `(0.0, 1.0]`
    /// and `wait` is positive.
    pub fn new(percentile: f64, wait: Duration) -> Result<Self, Error> {
        if !(percentile > 0.0 && percentile <= 1.0) {
            return Err(Error::Configuration(
                "longtail_percentile must be between 0.0 and 1.0".to_string(),
            ));
        }
        if wait.is_zero() {
            return Err(Error::Configuration(
                "longtail_wait must be positive".to_string(),
            ));
        }
        Ok(Self { percentile, wait })
    }

    /// The completion fraction that arms the cancellation timer.
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// How long to wait after the threshold is reached before cancelling.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Number of completions that arm the timer for a batch of `batch_len`.
    pub(crate) fn threshold(&self, batch_len: usize) -> usize {
        (batch_len as f64 * self.percentile).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_ceil_of_fraction() {
        let policy = LongtailPolicy::new(0.8, Duration::from_millis(500)).unwrap();
        assert_eq!(policy.threshold(5), 4);
        assert_eq!(policy.threshold(10), 8);
        assert_eq!(policy.threshold(1), 1);

        let half = LongtailPolicy::new(0.5, Duration::from_millis(500)).unwrap();
        assert_eq!(half.threshold(10), 5);
        assert_eq!(half.threshold(3), 2);

        let all = LongtailPolicy::new(1.0, Duration::from_millis(500)).unwrap();
        assert_eq!(all.threshold(7), 7);
    }

    #[test]
    fn threshold_is_at_least_one_for_nonempty_batches() {
        let tiny = LongtailPolicy::new(0.01, Duration::from_millis(1)).unwrap();
        assert_eq!(tiny.threshold(1), 1);
        assert_eq!(tiny.threshold(50), 1);
    }

    #[test]
    fn rejects_percentile_out_of_range() {
        for bad in [0.0, -0.1, 1.5] {
            let err = LongtailPolicy::new(bad, Duration::from_secs(1)).unwrap_err();
            assert!(err.to_string().contains("between 0.0 and 1.0"));
        }
    }

    #[test]
    fn accepts_full_percentile() {
        assert!(LongtailPolicy::new(1.0, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn rejects_zero_wait() {
        let err = LongtailPolicy::new(0.5, Duration::ZERO).unwrap_err();
        assert!(err.to_string().contains("longtail_wait"));
    }
}
