//! Outcome collection and progress reporting.

use super::error::{FetchFailure, FetchOutcome};
use crate::record::FightRecord;
use std::sync::Arc;
use tracing::warn;

/// Sink for fractional batch progress.
///
/// Called after each fight reaches its terminal outcome, with
/// `completed / total` in `[0.0, 1.0]`. Implementations should return
/// quickly; the collector calls them inline between task completions.
pub trait ProgressReporter: Send + Sync {
    fn progress(&self, fraction: f64);
}

/// Reporter that discards updates, for callers that do not track progress.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn progress(&self, _fraction: f64) {}
}

/// Partitioned outcomes of a fight batch.
///
/// Records arrive in completion order, which is unrelated to submission
/// order since fetches run concurrently.
#[derive(Debug, Default)]
pub struct BatchResults {
    /// Successfully fetched fights, in completion order.
    pub records: Vec<FightRecord>,

    /// Fights that failed terminally, in completion order.
    pub failures: Vec<FetchFailure>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.records.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn total_count(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Consumes fetch outcomes as they complete, partitioning them and
/// notifying an optional progress sink.
pub struct ResultCollector {
    results: BatchResults,
    total: usize,
    completed: usize,
    progress: Option<Arc<dyn ProgressReporter>>,
}

impl ResultCollector {
    /// Creates a collector expecting `total` outcomes.
    pub fn new(total: usize, progress: Option<Arc<dyn ProgressReporter>>) -> Self {
        Self {
            results: BatchResults::new(),
            total,
            completed: 0,
            progress,
        }
    }

    /// Records one terminal outcome and reports progress.
    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            Ok(record) => self.results.records.push(record),
            Err(failure) => {
                warn!(
                    id = %failure.id,
                    attempts = failure.attempts,
                    error = %failure.error,
                    "fight fetch failed terminally"
                );
                self.results.failures.push(failure);
            }
        }

        self.completed += 1;
        if let Some(ref reporter) = self.progress {
            reporter.progress(self.completed as f64 / self.total.max(1) as f64);
        }
    }

    /// Outcomes recorded so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Finishes collection and yields the partitioned results.
    pub fn finish(self) -> BatchResults {
        self.results
    }
}
