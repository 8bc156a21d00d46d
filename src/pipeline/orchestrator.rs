//! Batch orchestration: fan-out, collection, flattening.

use super::aggregator::{ProgressReporter, ResultCollector};
use super::error::{FetchFailure, HarvestError};
use super::fetcher::fetch_detail;
use super::gate::FetchGate;
use super::rate_limiter::SlidingWindowLimiter;
use super::retry::RetryPolicy;
use crate::classes::ClassNameMap;
use crate::config::FetchConfig;
use crate::flatten::{flatten, FightRow};
use crate::herald::FightSource;
use crate::record::FightId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything one harvest run produced.
///
/// Failures are carried alongside the rows, never folded into them: a
/// fight that failed contributes zero rows and exactly one failure entry.
/// Both collections empty means the input batch was empty (or the run was
/// cancelled before anything completed).
#[derive(Debug, Default)]
pub struct HarvestOutcome {
    /// Flat rows from every successfully fetched fight, in fetch
    /// completion order; within one fight, winners before losers.
    pub rows: Vec<FightRow>,

    /// Fights that failed terminally.
    pub failures: Vec<FetchFailure>,
}

impl HarvestOutcome {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.failures.is_empty()
    }
}

/// Runs fight batches against a source under shared rate, concurrency,
/// and retry constraints.
///
/// The limiter and gate are shared by all fetch tasks of a run (and by
/// consecutive runs of the same harvester, which keeps the rate budget
/// honest across back-to-back batches). The harvester holds no per-run
/// state: rows and failures are handed to the caller and forgotten.
///
/// # Example
///
/// ```ignore
/// use fightfeed::config::FetchConfig;
/// use fightfeed::herald::HeraldClient;
/// use fightfeed::pipeline::Harvester;
/// use std::sync::Arc;
///
/// let source = Arc::new(HeraldClient::new(session_token)?);
/// let harvester = Harvester::new(source, &FetchConfig::default())?;
/// let outcome = harvester.harvest(new_ids).await?;
/// // outcome.rows -> storage; outcome.failures -> operator attention
/// ```
pub struct Harvester<S> {
    source: Arc<S>,
    limiter: Arc<SlidingWindowLimiter>,
    gate: Arc<FetchGate>,
    policy: RetryPolicy,
    request_timeout: Duration,
    max_fights_per_run: Option<usize>,
    progress: Option<Arc<dyn ProgressReporter>>,
}

impl<S: FightSource> Harvester<S> {
    /// Creates a harvester from a validated configuration.
    pub fn new(source: Arc<S>, config: &FetchConfig) -> Result<Self, HarvestError> {
        config.validate()?;

        Ok(Self {
            source,
            limiter: Arc::new(SlidingWindowLimiter::new(
                config.requests_per_second(),
                config.window(),
            )),
            gate: Arc::new(FetchGate::new(config.max_concurrent_requests())),
            policy: RetryPolicy::from_config(config),
            request_timeout: config.request_timeout(),
            max_fights_per_run: config.max_fights_per_run(),
            progress: None,
        })
    }

    /// Attaches a progress sink notified after each terminal outcome.
    pub fn with_progress(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Fetches every fight in `ids` and flattens the successes against a
    /// pre-loaded class map.
    ///
    /// Ids are expected to be deduplicated and filtered against already
    /// stored fights by the caller. An empty batch is a cheap no-op.
    pub async fn run(&self, ids: Vec<FightId>, classes: &ClassNameMap) -> HarvestOutcome {
        self.run_inner(ids, classes, None).await
    }

    /// Like [`run`](Self::run), but abandons outstanding fetches when the
    /// token fires and returns whatever completed up to that point.
    pub async fn run_cancellable(
        &self,
        ids: Vec<FightId>,
        classes: &ClassNameMap,
        cancel: CancellationToken,
    ) -> HarvestOutcome {
        self.run_inner(ids, classes, Some(cancel)).await
    }

    /// Convenience entry point: loads the class map from the same source,
    /// then runs the batch.
    ///
    /// Fails fast if the class map cannot be loaded; flattening against a
    /// missing or empty map is never attempted.
    pub async fn harvest(&self, ids: Vec<FightId>) -> Result<HarvestOutcome, HarvestError> {
        if ids.is_empty() {
            debug!("empty fight batch, nothing to fetch");
            return Ok(HarvestOutcome::default());
        }

        let classes = ClassNameMap::load(self.source.as_ref()).await?;
        Ok(self.run(ids, &classes).await)
    }

    async fn run_inner(
        &self,
        mut ids: Vec<FightId>,
        classes: &ClassNameMap,
        cancel: Option<CancellationToken>,
    ) -> HarvestOutcome {
        if ids.is_empty() {
            debug!("empty fight batch, nothing to fetch");
            return HarvestOutcome::default();
        }

        if let Some(cap) = self.max_fights_per_run {
            if ids.len() > cap {
                warn!(
                    batch = ids.len(),
                    cap,
                    dropped = ids.len() - cap,
                    "fight batch exceeds per-run cap, truncating"
                );
                ids.truncate(cap);
            }
        }

        let total = ids.len();
        debug!(total, "starting fight batch");

        let mut fetches = JoinSet::new();
        for id in ids {
            let source = Arc::clone(&self.source);
            let limiter = Arc::clone(&self.limiter);
            let gate = Arc::clone(&self.gate);
            let policy = self.policy;
            let request_timeout = self.request_timeout;

            fetches.spawn(async move {
                fetch_detail(id, source, limiter, gate, policy, request_timeout).await
            });
        }

        let mut collector = ResultCollector::new(total, self.progress.clone());

        match cancel {
            None => {
                while let Some(joined) = fetches.join_next().await {
                    match joined {
                        Ok(outcome) => collector.record(outcome),
                        Err(join_err) => warn!(error = %join_err, "fetch task panicked"),
                    }
                }
            }
            Some(token) => loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => {
                        debug!(
                            completed = collector.completed(),
                            total,
                            "harvest cancelled, abandoning outstanding fetches"
                        );
                        fetches.abort_all();
                        // Drain: aborted tasks surface as cancelled join
                        // errors, already-finished ones still count.
                        while let Some(joined) = fetches.join_next().await {
                            if let Ok(outcome) = joined {
                                collector.record(outcome);
                            }
                        }
                        break;
                    }

                    joined = fetches.join_next() => {
                        match joined {
                            Some(Ok(outcome)) => collector.record(outcome),
                            Some(Err(join_err)) => {
                                if !join_err.is_cancelled() {
                                    warn!(error = %join_err, "fetch task panicked");
                                }
                            }
                            None => break,
                        }
                    }
                }
            },
        }

        let results = collector.finish();
        info!(
            succeeded = results.success_count(),
            failed = results.failure_count(),
            total,
            "fight batch complete"
        );

        let mut rows = Vec::new();
        for record in &results.records {
            rows.extend(flatten(record, classes));
        }

        HarvestOutcome {
            rows,
            failures: results.failures,
        }
    }
}
