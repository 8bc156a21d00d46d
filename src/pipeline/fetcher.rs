//! Single-fight fetch with admission, retry, and validation.

use super::error::{FetchError, FetchFailure, FetchOutcome};
use super::gate::FetchGate;
use super::rate_limiter::SlidingWindowLimiter;
use super::retry::{RetryDecision, RetryPolicy};
use crate::herald::FightSource;
use crate::record::{FightDetail, FightId, FightRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace};

/// Admission key shared by all detail fetches in a run; the herald's rate
/// budget is global, not per fight.
const RATE_LIMIT_KEY: &str = "herald";

/// Fixed wait before re-checking admission after a rate-limiter rejection.
/// Deliberately a different delay class from retry backoff: a full window
/// is contention, not failure, and costs no retry budget.
const ADMISSION_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Fetches one fight to its single terminal outcome.
///
/// Holds a gate slot for the whole fetch lifecycle, retries included, and
/// releases it on every exit path when the permit drops. Each attempt
/// first clears sliding-window admission (waiting and re-checking on
/// rejection; which of several waiting fetches is admitted next is
/// unordered), then issues the request under the per-attempt timeout, then
/// structurally validates the body. Transient failures are retried under
/// `policy`; permanent ones terminate immediately.
pub async fn fetch_detail<S: FightSource>(
    id: FightId,
    source: Arc<S>,
    limiter: Arc<SlidingWindowLimiter>,
    gate: Arc<FetchGate>,
    policy: RetryPolicy,
    request_timeout: Duration,
) -> FetchOutcome {
    let _slot = gate.acquire().await;

    let mut attempt: u32 = 1;
    loop {
        while !limiter.admit(RATE_LIMIT_KEY) {
            trace!(id = %id, "rate window full, delaying admission");
            sleep(ADMISSION_RETRY_DELAY).await;
        }

        trace!(id = %id, attempt, "fetching fight detail");
        let error = match timeout(request_timeout, source.fight_detail(&id)).await {
            Ok(Ok(bytes)) => match FightDetail::from_json(&bytes) {
                Ok(detail) => {
                    debug!(id = %id, attempt, participants = detail.participant_count(), "fight detail fetched");
                    return Ok(FightRecord::new(id, detail));
                }
                Err(parse_err) => FetchError::MalformedPayload(parse_err.to_string()),
            },
            Ok(Err(source_err)) => FetchError::from(source_err),
            Err(_) => FetchError::Timeout(request_timeout),
        };

        match policy.on_failure(attempt, &error) {
            RetryDecision::Retry { wait } => {
                debug!(
                    id = %id,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %error,
                    "fight fetch failed, will retry"
                );
                sleep(wait).await;
                attempt += 1;
            }
            RetryDecision::GiveUp => {
                return Err(FetchFailure {
                    id,
                    attempts: attempt,
                    error,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::herald::HeraldError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const GOOD_BODY: &str =
        r#"{ "s": "2025-06-01", "a": { "p": [ { "n": "Keeva", "c": 1 } ] }, "b": { "p": [] } }"#;

    /// Source that replays a scripted sequence of responses and counts the
    /// requests it actually receives.
    struct ScriptedSource {
        responses: Mutex<Vec<Result<Vec<u8>, HeraldError>>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<u8>, HeraldError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FightSource for ScriptedSource {
        async fn fight_detail(&self, _id: &FightId) -> Result<Vec<u8>, HeraldError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            }
        }

        async fn class_config(&self) -> Result<Vec<u8>, HeraldError> {
            Ok(Vec::new())
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1), 1.0)
    }

    fn generous_limiter() -> Arc<SlidingWindowLimiter> {
        Arc::new(SlidingWindowLimiter::new(1000, Duration::from_secs(1)))
    }

    async fn run_fetch(source: Arc<ScriptedSource>, max_retries: u32) -> FetchOutcome {
        fetch_detail(
            "f_1".into(),
            source,
            generous_limiter(),
            Arc::new(FetchGate::new(2)),
            fast_policy(max_retries),
            Duration::from_secs(5),
        )
        .await
    }

    #[tokio::test]
    async fn first_attempt_success() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(GOOD_BODY.as_bytes().to_vec())]));

        let record = run_fetch(Arc::clone(&source), 5).await.unwrap();

        assert_eq!(record.id.as_str(), "f_1");
        assert_eq!(record.detail.winners.participants.len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn transient_failures_then_success() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err(HeraldError::Http { status: 502 }),
            Err(HeraldError::Transport("connection reset".into())),
            Ok(GOOD_BODY.as_bytes().to_vec()),
        ]));

        let record = run_fetch(Arc::clone(&source), 5).await.unwrap();

        assert_eq!(record.id.as_str(), "f_1");
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_is_terminal_with_exact_attempts() {
        let source = Arc::new(ScriptedSource::new(vec![Err(HeraldError::Http {
            status: 503,
        })]));

        let failure = run_fetch(Arc::clone(&source), 4).await.unwrap_err();

        assert_eq!(failure.id.as_str(), "f_1");
        assert_eq!(failure.attempts, 4);
        assert_eq!(failure.error, FetchError::Status { status: 503 });
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn not_found_is_terminal_on_first_attempt() {
        let source = Arc::new(ScriptedSource::new(vec![Err(HeraldError::Http {
            status: 404,
        })]));

        let failure = run_fetch(Arc::clone(&source), 5).await.unwrap_err();

        assert_eq!(failure.attempts, 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_terminal_on_first_attempt() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(
            b"<html>maintenance</html>".to_vec()
        )]));

        let failure = run_fetch(Arc::clone(&source), 5).await.unwrap_err();

        assert_eq!(failure.attempts, 1);
        assert!(matches!(failure.error, FetchError::MalformedPayload(_)));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn rate_limiter_rejection_costs_no_attempts() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(GOOD_BODY.as_bytes().to_vec())]));
        // One admission per 100ms window, already spent: the fetch must
        // wait out the window without burning retry budget.
        let limiter = Arc::new(SlidingWindowLimiter::new(1, Duration::from_millis(100)));
        assert!(limiter.admit("herald"));

        let outcome = fetch_detail(
            "f_1".into(),
            Arc::clone(&source),
            limiter,
            Arc::new(FetchGate::new(1)),
            fast_policy(1),
            Duration::from_secs(5),
        )
        .await;

        assert!(outcome.is_ok());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn gate_slot_released_after_terminal_failure() {
        let source = Arc::new(ScriptedSource::new(vec![Err(HeraldError::Http {
            status: 404,
        })]));
        let gate = Arc::new(FetchGate::new(1));

        let outcome = fetch_detail(
            "f_1".into(),
            source,
            generous_limiter(),
            Arc::clone(&gate),
            fast_policy(2),
            Duration::from_secs(5),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(gate.in_flight(), 0);
        assert_eq!(gate.available_permits(), 1);
    }
}
