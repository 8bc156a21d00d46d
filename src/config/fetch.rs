//! Fetch pipeline configuration.

use super::defaults::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAX_CONCURRENT_REQUESTS,
    DEFAULT_MAX_RETRIES, DEFAULT_REQUESTS_PER_SECOND, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_WINDOW_SECS,
};
use std::time::Duration;
use thiserror::Error;

/// Errors from an inconsistent configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("backoff_multiplier must be at least 1.0, got {0}")]
    MultiplierTooSmall(f64),
}

/// Configuration for one harvest run's fetch pipeline.
///
/// Constructed by the caller and passed in; nothing here is read from
/// globals. All knobs have defaults matching the herald's observed
/// tolerances.
///
/// # Example
///
/// ```
/// use fightfeed::config::FetchConfig;
/// use std::time::Duration;
///
/// let config = FetchConfig::default();
/// assert_eq!(config.requests_per_second(), 5);
/// assert_eq!(config.max_retries(), 5);
///
/// let config = FetchConfig::new()
///     .with_max_concurrent_requests(8)
///     .with_initial_backoff(Duration::from_millis(500))
///     .with_max_fights_per_run(Some(200));
/// assert_eq!(config.max_concurrent_requests(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchConfig {
    /// Admissions allowed per sliding window.
    requests_per_second: u32,
    /// Length of the sliding admission window.
    window: Duration,
    /// Simultaneous in-flight detail fetches.
    max_concurrent_requests: usize,
    /// Total attempts per fight, first try included.
    max_retries: u32,
    /// Wait before the first retry.
    initial_backoff: Duration,
    /// Growth factor applied to the backoff before each further retry.
    backoff_multiplier: f64,
    /// Per-attempt request timeout.
    request_timeout: Duration,
    /// Optional cap on fights fetched in one run.
    max_fights_per_run: Option<usize>,
}

impl FetchConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requests_per_second(mut self, requests: u32) -> Self {
        self.requests_per_second = requests;
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    pub fn with_max_retries(mut self, attempts: u32) -> Self {
        self.max_retries = attempts;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_fights_per_run(mut self, cap: Option<usize>) -> Self {
        self.max_fights_per_run = cap;
        self
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn max_fights_per_run(&self) -> Option<usize> {
        self.max_fights_per_run
    }

    /// Checks the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests_per_second == 0 {
            return Err(ConfigError::NotPositive {
                field: "requests_per_second",
            });
        }
        if self.window.is_zero() {
            return Err(ConfigError::NotPositive { field: "window" });
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_concurrent_requests",
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_retries",
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::NotPositive {
                field: "request_timeout",
            });
        }
        if self.backoff_multiplier < 1.0 {
            return Err(ConfigError::MultiplierTooSmall(self.backoff_multiplier));
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_secs(DEFAULT_INITIAL_BACKOFF_SECS),
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_fights_per_run: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = FetchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.requests_per_second(), DEFAULT_REQUESTS_PER_SECOND);
        assert_eq!(config.window(), Duration::from_secs(DEFAULT_WINDOW_SECS));
        assert_eq!(config.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(config.max_fights_per_run(), None);
    }

    #[test]
    fn builder_chain_overrides_fields() {
        let config = FetchConfig::new()
            .with_requests_per_second(10)
            .with_window(Duration::from_secs(2))
            .with_max_concurrent_requests(3)
            .with_max_retries(2)
            .with_initial_backoff(Duration::from_millis(100))
            .with_backoff_multiplier(1.5)
            .with_request_timeout(Duration::from_secs(5))
            .with_max_fights_per_run(Some(50));

        assert_eq!(config.requests_per_second(), 10);
        assert_eq!(config.window(), Duration::from_secs(2));
        assert_eq!(config.max_concurrent_requests(), 3);
        assert_eq!(config.max_retries(), 2);
        assert_eq!(config.initial_backoff(), Duration::from_millis(100));
        assert_eq!(config.backoff_multiplier(), 1.5);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_fights_per_run(), Some(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_counts_fail_validation() {
        assert_eq!(
            FetchConfig::new().with_requests_per_second(0).validate(),
            Err(ConfigError::NotPositive {
                field: "requests_per_second"
            })
        );
        assert_eq!(
            FetchConfig::new().with_max_concurrent_requests(0).validate(),
            Err(ConfigError::NotPositive {
                field: "max_concurrent_requests"
            })
        );
        assert_eq!(
            FetchConfig::new().with_max_retries(0).validate(),
            Err(ConfigError::NotPositive {
                field: "max_retries"
            })
        );
        assert_eq!(
            FetchConfig::new().with_window(Duration::ZERO).validate(),
            Err(ConfigError::NotPositive { field: "window" })
        );
    }

    #[test]
    fn shrinking_multiplier_fails_validation() {
        assert_eq!(
            FetchConfig::new().with_backoff_multiplier(0.5).validate(),
            Err(ConfigError::MultiplierTooSmall(0.5))
        );
    }
}
