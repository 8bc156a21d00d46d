//! Herald access layer.
//!
//! Everything that talks HTTP to the Eden herald lives here, behind two
//! seams:
//!
//! - [`AsyncHttpClient`]: raw GET transport, mockable in tests.
//! - [`FightSource`]: what the fetch pipeline consumes, detail payloads
//!   and the class configuration document, as raw bytes.
//!
//! [`HeraldClient`] is the production [`FightSource`]; the pipeline itself
//! never names it, so tests drive the pipeline with scripted sources.

mod client;
mod http;
mod types;

pub use client::{HeraldClient, DEFAULT_BASE_URL};
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use types::{FightSource, HeraldError};
