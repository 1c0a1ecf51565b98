//! Retry timing

use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;

/// How long and how often to retry throttled or failing requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed while the platform answers 429.
    pub max_rate_limit_attempts: u32,
    /// Total attempts allowed on 5xx and network failures.
    pub max_unavailable_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_attempts: 5,
            max_unavailable_attempts: 3,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A fresh exponential schedule for one request. Intervals are
    /// deterministic and never give up on their own; the attempt limits
    /// above bound the retries.
    pub fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_backoff,
            initial_interval: self.initial_backoff,
            randomization_factor: 0.0,
            multiplier: self.multiplier,
            max_interval: self.max_backoff,
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }

    /// Wait before the next attempt: the server's hint when it gave one,
    /// otherwise the next interval of `schedule`. Never exceeds
    /// `max_backoff`.
    pub fn next_delay(&self, hint: Option<Duration>, schedule: &mut ExponentialBackoff) -> Duration {
        let delay = match hint {
            Some(hint) => hint,
            None => schedule.next_backoff().unwrap_or(self.max_backoff),
        };
        delay.min(self.max_backoff)
    }
}
