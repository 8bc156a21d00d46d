//! Retry policy for detail fetches.
//!
//! Extracted from the fetch loop so the attempt budget and backoff curve
//! are testable without any transport. The policy is a pure decision
//! function: after attempt `n` fails, it either schedules a wait before
//! attempt `n + 1` or declares the failure terminal.
//!
//! Waits grow exponentially: the first retry waits `initial_backoff`, each
//! further retry multiplies that by `multiplier`. The first attempt itself
//! never waits. A rate-limiter rejection is not an attempt at all; the
//! fetcher handles it with its own fixed delay.

use super::error::FetchError;
use crate::config::FetchConfig;
use std::time::Duration;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then attempt again.
    Retry { wait: Duration },
    /// The failure is terminal; stop.
    GiveUp,
}

/// Attempt budget and backoff curve for one fight's fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed, first try included.
    max_retries: u32,
    /// Wait before the first retry.
    initial_backoff: Duration,
    /// Growth factor for each further retry.
    multiplier: f64,
}

impl RetryPolicy {
    /// Creates a policy.
    ///
    /// # Panics
    ///
    /// Panics if `max_retries` is 0 or `multiplier` is below 1.0; use
    /// [`FetchConfig::validate`] to reject such values gracefully first.
    pub fn new(max_retries: u32, initial_backoff: Duration, multiplier: f64) -> Self {
        assert!(max_retries > 0, "max_retries must be > 0");
        assert!(multiplier >= 1.0, "multiplier must be >= 1.0");

        Self {
            max_retries,
            initial_backoff,
            multiplier,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_retries(),
            config.initial_backoff(),
            config.backoff_multiplier(),
        )
    }

    /// Total attempts allowed, first try included.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decides what follows the failure of attempt `attempt` (1-based).
    ///
    /// Permanent errors give up immediately regardless of remaining
    /// budget; transient errors retry until the budget is spent.
    pub fn on_failure(&self, attempt: u32, error: &FetchError) -> RetryDecision {
        if !error.is_transient() {
            return RetryDecision::GiveUp;
        }
        if attempt >= self.max_retries {
            return RetryDecision::GiveUp;
        }
        RetryDecision::Retry {
            wait: self.backoff_after(attempt),
        }
    }

    /// The wait between attempt `attempt` and the next one:
    /// `initial_backoff * multiplier^(attempt - 1)`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.initial_backoff.mul_f64(self.multiplier.powi(exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> FetchError {
        FetchError::Status { status: 502 }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), 2.0);

        assert_eq!(policy.backoff_after(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_after(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_after(3), Duration::from_secs(4));
        assert_eq!(policy.backoff_after(4), Duration::from_secs(8));
    }

    #[test]
    fn flat_curve_with_unit_multiplier() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250), 1.0);

        assert_eq!(policy.backoff_after(1), Duration::from_millis(250));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(250));
    }

    #[test]
    fn transient_failures_retry_until_budget_spent() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0);

        assert_eq!(
            policy.on_failure(1, &transient()),
            RetryDecision::Retry {
                wait: Duration::from_secs(1)
            }
        );
        assert_eq!(
            policy.on_failure(2, &transient()),
            RetryDecision::Retry {
                wait: Duration::from_secs(2)
            }
        );
        assert_eq!(policy.on_failure(3, &transient()), RetryDecision::GiveUp);
    }

    #[test]
    fn permanent_failure_gives_up_immediately() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), 2.0);

        let not_found = FetchError::Status { status: 404 };
        assert_eq!(policy.on_failure(1, &not_found), RetryDecision::GiveUp);

        let malformed = FetchError::MalformedPayload("truncated".into());
        assert_eq!(policy.on_failure(1, &malformed), RetryDecision::GiveUp);
    }

    #[test]
    fn single_attempt_budget_never_retries() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1), 2.0);
        assert_eq!(policy.on_failure(1, &transient()), RetryDecision::GiveUp);
    }

    #[test]
    #[should_panic(expected = "max_retries must be > 0")]
    fn zero_budget_panics() {
        RetryPolicy::new(0, Duration::from_secs(1), 2.0);
    }
}
