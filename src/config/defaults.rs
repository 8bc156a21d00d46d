//! Default values for fetch configuration.

/// Admissions allowed per sliding window.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

/// Length of the sliding admission window, in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 1;

/// Simultaneous in-flight detail fetches.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Total attempts per fight, first try included.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Wait before the first retry, in seconds.
pub const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 1;

/// Growth factor applied to the backoff before each further retry.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Per-attempt request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
