//! Retry controller: bounded retries with exponential backoff and jitter.
//!
//! Per-batch state machine: Pending -> Attempting -> {Delivered |
//! Abandoned}. Attempting loops back to itself through a backoff sleep on
//! transient failures; permanent failures abandon immediately without
//! consuming retry budget.
//!
//! The backoff delay doubles per attempt from `base_delay`, is capped at
//! `max_delay`, and carries uniform random jitter of up to half the
//! computed delay so synchronized clients do not retry in lockstep.

use std::time::Duration;

use rand::RngExt;

use crate::error::ShipError;
use hec_client::{HecAck, HecEvent, Transport};

/// Backoff shape and retry budget for one batch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means exactly one attempt.
    pub max_retries: usize,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Upper bound on the pre-jitter delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Pre-jitter delay before retry number `prior_attempts + 1`.
    fn raw_delay(&self, prior_attempts: u32) -> Duration {
        let factor = 2u32.saturating_pow(prior_attempts);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Jittered delay before the next retry.
    fn next_delay(&self, prior_attempts: u32) -> Duration {
        let raw = self.raw_delay(prior_attempts);
        let jitter_ms = rand::rng().random_range(0..=raw.as_millis() as u64 / 2);
        raw + Duration::from_millis(jitter_ms)
    }
}

/// Terminal state of one batch's delivery cycle.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The collector acknowledged the batch.
    Delivered {
        /// The collector's acknowledgment.
        ack: HecAck,
        /// Total delivery attempts made, including the successful one.
        attempts: usize,
    },
    /// Retries were exhausted or the failure was permanent.
    Abandoned(ShipError),
}

/// Drive one batch to a terminal state.
///
/// Backoff sleeps suspend only this future; the caller keeps accumulating
/// new events concurrently.
pub async fn run<T: Transport>(
    transport: &T,
    events: &[HecEvent],
    policy: &RetryPolicy,
) -> DeliveryOutcome {
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        match transport.deliver(events).await {
            Ok(ack) => return DeliveryOutcome::Delivered { ack, attempts },
            Err(err) if err.is_transient() && attempts <= policy.max_retries => {
                let delay = policy.next_delay((attempts - 1) as u32);
                tracing::debug!(
                    attempt = attempts,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient delivery failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                return DeliveryOutcome::Abandoned(ShipError {
                    attempts,
                    source: err,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base_ms: u64, max_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
        }
    }

    #[test]
    fn test_raw_delay_doubles() {
        let p = policy(100, 60_000);
        assert_eq!(p.raw_delay(0), Duration::from_millis(100));
        assert_eq!(p.raw_delay(1), Duration::from_millis(200));
        assert_eq!(p.raw_delay(2), Duration::from_millis(400));
        assert_eq!(p.raw_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_raw_delay_capped() {
        let p = policy(100, 500);
        assert_eq!(p.raw_delay(3), Duration::from_millis(500));
        assert_eq!(p.raw_delay(30), Duration::from_millis(500));
    }

    #[test]
    fn test_jitter_bounded_by_half_delay() {
        let p = policy(100, 60_000);
        for prior in 0..5 {
            let raw = p.raw_delay(prior);
            let jittered = p.next_delay(prior);
            assert!(jittered >= raw);
            assert!(jittered <= raw + raw / 2);
        }
    }
}
