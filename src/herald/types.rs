//! Herald source trait and error type.

use crate::record::FightId;
use std::future::Future;
use thiserror::Error;

/// Errors surfaced by a fight source.
///
/// The numeric HTTP status is preserved rather than flattened into a
/// message so the retry policy can classify by status class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeraldError {
    /// The herald answered with a non-success status.
    #[error("herald returned HTTP {status}")]
    Http { status: u16 },

    /// The request never produced a usable response (connect failure,
    /// client-side timeout, interrupted body read).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Source of raw fight data.
///
/// Implementations return response bodies as raw bytes; parsing and
/// structural validation happen at the pipeline boundary, not here. The
/// production implementation is [`HeraldClient`](super::HeraldClient);
/// tests substitute scripted sources.
pub trait FightSource: Send + Sync + 'static {
    /// Fetches the raw detail payload for one fight.
    fn fight_detail(
        &self,
        id: &FightId,
    ) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send;

    /// Fetches the class configuration document.
    fn class_config(&self) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send;
}
