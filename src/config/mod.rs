//! Run-scoped configuration.
//!
//! The harvester takes an explicit [`FetchConfig`] built by the caller;
//! there is no module-level or environment-driven state. Defaults live in
//! [`defaults`] as named constants.

pub mod defaults;
mod fetch;

pub use fetch::{ConfigError, FetchConfig};
