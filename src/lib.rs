//! fightfeed - concurrent harvesting of Eden DAoC fight records.
//!
//! Given a batch of fight ids, this crate fetches each fight's detail
//! payload from the herald under a global rate budget and bounded
//! concurrency, retries transient failures with exponential backoff, and
//! flattens every fetched fight into one row per participant. Partial
//! failure is the normal case: failed fights are reported next to the
//! rows, never silently dropped.
//!
//! Login/session acquisition, storage, and scheduling live outside this
//! crate; it consumes an opaque session token and hands back rows.
//!
//! # Example
//!
//! ```ignore
//! use fightfeed::config::FetchConfig;
//! use fightfeed::herald::HeraldClient;
//! use fightfeed::pipeline::Harvester;
//! use fightfeed::record::FightId;
//! use std::sync::Arc;
//!
//! let source = Arc::new(HeraldClient::new(session_token)?);
//! let harvester = Harvester::new(source, &FetchConfig::default())?;
//!
//! let ids: Vec<FightId> = new_ids.into_iter().map(FightId::from).collect();
//! let outcome = harvester.harvest(ids).await?;
//!
//! storage.upsert_rows(&outcome.rows).await?;
//! for failure in &outcome.failures {
//!     eprintln!("skipped {}: {}", failure.id, failure.error);
//! }
//! ```

pub mod classes;
pub mod config;
pub mod flatten;
pub mod herald;
pub mod logging;
pub mod pipeline;
pub mod record;

/// Version of the fightfeed library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
