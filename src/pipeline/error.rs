//! Failure taxonomy for the fetch pipeline.
//!
//! Two tiers, kept strictly apart:
//!
//! - Per-fight failures ([`FetchError`], [`FetchFailure`]): recovered
//!   locally, the batch continues, and the failure is reported alongside
//!   the successes.
//! - Run-level failures ([`HarvestError`]): the run cannot proceed at all
//!   (bad configuration, no class map).

use crate::classes::ClassConfigError;
use crate::config::ConfigError;
use crate::herald::HeraldError;
use crate::record::{FightId, FightRecord};
use std::time::Duration;
use thiserror::Error;

/// Why one fetch attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The attempt exceeded the per-request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The herald answered with a non-success status.
    #[error("herald returned HTTP {status}")]
    Status { status: u16 },

    /// The response body failed structural validation. Retrying cannot
    /// fix the body, so this is terminal on first sight.
    #[error("malformed fight payload: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Server-side trouble (5xx), throttling (429), request timeouts (408)
    /// and transport faults are worth retrying. Other 4xx statuses mean the
    /// request itself is bad, most commonly a fight id the herald does not
    /// know, and a malformed body will be just as malformed next time.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status } => *status >= 500 || matches!(status, 408 | 429),
            FetchError::MalformedPayload(_) => false,
        }
    }
}

impl From<HeraldError> for FetchError {
    fn from(err: HeraldError) -> Self {
        match err {
            HeraldError::Http { status } => FetchError::Status { status },
            HeraldError::Transport(message) => FetchError::Transport(message),
        }
    }
}

/// A fight that failed terminally: no more retries will be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// The fight that could not be fetched.
    pub id: FightId,
    /// Attempts performed before giving up.
    pub attempts: u32,
    /// The last error observed.
    pub error: FetchError,
}

/// The single terminal outcome of one fight's fetch.
pub type FetchOutcome = Result<FightRecord, FetchFailure>;

/// Errors that abort a harvest run before or instead of fetching.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The class name map could not be loaded; flattening cannot proceed.
    #[error("class name map unavailable: {0}")]
    ClassConfig(#[from] ClassConfigError),

    /// The supplied configuration is unusable.
    #[error("invalid fetch configuration: {0}")]
    Config(#[from] ConfigError),
}
