//! Concurrency gate for in-flight fetches.
//!
//! A counting semaphore bounding how many detail fetches run at once. The
//! permit is an RAII guard, so every exit path out of the guarded section
//! (success, terminal failure, task abort) releases the slot when the guard
//! drops; a leaked slot would otherwise shrink the pipeline permanently.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Gate bounding simultaneous in-flight fetches.
///
/// In-flight and peak counters exist for diagnostics and for tests that
/// assert the bound is never exceeded.
#[derive(Debug)]
pub struct FetchGate {
    semaphore: Arc<Semaphore>,
    max_permits: usize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FetchGate {
    /// Creates a gate with the given number of slots.
    ///
    /// # Panics
    ///
    /// Panics if `max_concurrent` is 0.
    pub fn new(max_concurrent: usize) -> Self {
        assert!(max_concurrent > 0, "max_concurrent must be > 0");

        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_permits: max_concurrent,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Acquires a slot, waiting until one is free.
    ///
    /// The slot is released when the returned permit drops.
    pub async fn acquire(&self) -> FetchPermit<'_> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed unexpectedly");

        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::Relaxed);

        FetchPermit {
            _permit: permit,
            in_flight: &self.in_flight,
        }
    }

    /// Tries to acquire a slot without waiting.
    pub fn try_acquire(&self) -> Option<FetchPermit<'_>> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;

        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::Relaxed);

        Some(FetchPermit {
            _permit: permit,
            in_flight: &self.in_flight,
        })
    }

    /// Returns the configured slot count.
    pub fn max_concurrent(&self) -> usize {
        self.max_permits
    }

    /// Returns the number of currently held slots.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns the highest number of simultaneously held slots observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    /// Returns the number of free slots.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// A held fetch slot. Dropping it frees the slot.
pub struct FetchPermit<'a> {
    _permit: OwnedSemaphorePermit,
    in_flight: &'a AtomicUsize,
}

impl Drop for FetchPermit<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
