//! Sliding-window request admission.
//!
//! Bounds how many requests may be *started* within any trailing time
//! window, independent of how many are currently in flight (that is the
//! gate's job). The window moves continuously: an admission ages out
//! exactly `window` after it was granted, so there is no burst at a bucket
//! boundary the way a fixed-reset counter allows.
//!
//! A rejected admission is a normal outcome the caller handles by waiting
//! and re-checking, not an error.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Admission limiter over a trailing time window, keyed by request class.
///
/// Each key keeps its own ledger of recent admission timestamps. The
/// check-prune-record step for one key runs under that key's map entry
/// lock, so concurrent fetch tasks cannot over-admit by racing the count.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    /// Admissions allowed per window, per key.
    max_admissions: u32,

    /// Trailing window length.
    window: Duration,

    /// Per-key admission timestamps, oldest first.
    ledger: DashMap<String, VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter admitting up to `max_admissions` per `window`.
    ///
    /// # Panics
    ///
    /// Panics if `max_admissions` is 0 or the window is empty.
    pub fn new(max_admissions: u32, window: Duration) -> Self {
        assert!(max_admissions > 0, "max_admissions must be > 0");
        assert!(!window.is_zero(), "window must be non-empty");

        Self {
            max_admissions,
            window,
            ledger: DashMap::new(),
        }
    }

    /// Attempts to admit one request under `key`.
    ///
    /// Returns `true` and records the admission if fewer than the allowed
    /// number of admissions happened within the trailing window; returns
    /// `false` otherwise, recording nothing.
    pub fn admit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut timestamps = self.ledger.entry(key.to_string()).or_default();

        while let Some(&oldest) = timestamps.front() {
            if now.duration_since(oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if (timestamps.len() as u32) < self.max_admissions {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Returns how many admissions for `key` still fall inside the window.
    pub fn current_load(&self, key: &str) -> usize {
        let now = Instant::now();
        self.ledger
            .get(key)
            .map(|timestamps| {
                timestamps
                    .iter()
                    .filter(|t| now.duration_since(**t) < self.window)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Returns the admissions allowed per window.
    pub fn max_admissions(&self) -> u32 {
        self.max_admissions
    }

    /// Returns the trailing window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.admit("api"));
        assert!(limiter.admit("api"));
        assert!(limiter.admit("api"));
        assert!(!limiter.admit("api"));
        assert_eq!(limiter.current_load("api"), 3);
    }

    #[test]
    fn rejection_records_nothing() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.admit("api"));
        assert!(!limiter.admit("api"));
        assert!(!limiter.admit("api"));
        assert_eq!(limiter.current_load("api"), 1);
    }

    #[test]
    fn window_expiry_re_admits() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_millis(40));

        assert!(limiter.admit("api"));
        assert!(limiter.admit("api"));
        assert!(!limiter.admit("api"));

        thread::sleep(Duration::from_millis(50));

        assert!(limiter.admit("api"));
        assert_eq!(limiter.current_load("api"), 1);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.admit("details"));
        assert!(!limiter.admit("details"));
        assert!(limiter.admit("config"));
    }

    #[test]
    fn unknown_key_has_no_load() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        assert_eq!(limiter.current_load("never_seen"), 0);
    }

    #[test]
    #[should_panic(expected = "max_admissions must be > 0")]
    fn zero_admissions_panics() {
        SlidingWindowLimiter::new(0, Duration::from_secs(1));
    }

    #[test]
    fn concurrent_admissions_never_exceed_limit() {
        use std::sync::Arc;

        let limiter = Arc::new(SlidingWindowLimiter::new(10, Duration::from_secs(60)));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(thread::spawn(move || {
                (0..5).filter(|_| limiter.admit("api")).count()
            }));
        }

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 10);
    }
}
