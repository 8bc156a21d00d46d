//! Class-code lookup table.
//!
//! Fight participants carry numeric class codes; the herald publishes the
//! code-to-name mapping as part of its character-planner configuration.
//! The mapping is fetched once per harvest run, before any flattening, and
//! is read-only for the run's duration. A missing code is a normal lookup
//! miss that resolves to [`UNKNOWN_CLASS_NAME`]; a missing *map* is fatal
//! for the whole run.

use crate::herald::{FightSource, HeraldError};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Placeholder name for class codes absent from the map.
pub const UNKNOWN_CLASS_NAME: &str = "Unknown";

/// Errors loading the class configuration.
///
/// All of these abort the harvest run before any detail fetching happens;
/// they are deliberately a separate type from per-fight fetch failures.
#[derive(Debug, Error)]
pub enum ClassConfigError {
    /// The configuration document could not be fetched.
    #[error("class config fetch failed: {0}")]
    Fetch(#[from] HeraldError),

    /// The configuration document is not valid JSON or has the wrong shape.
    #[error("class config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but lists no classes. Flattening against an
    /// empty map would label every participant "Unknown", so this is
    /// treated as a broken fetch rather than a legal configuration.
    #[error("class config lists no classes")]
    Empty,
}

/// Wire shape of the configuration document: class names keyed by name,
/// each carrying its numeric id (plus planner fields we ignore).
#[derive(Debug, Deserialize)]
struct ClassConfig {
    classes: HashMap<String, ClassEntry>,
}

#[derive(Debug, Deserialize)]
struct ClassEntry {
    id: u32,
}

/// Immutable mapping from class code to display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNameMap {
    names: HashMap<u32, String>,
}

impl ClassNameMap {
    /// Builds the map by inverting the herald's name-keyed configuration
    /// document.
    pub fn from_config_json(bytes: &[u8]) -> Result<Self, ClassConfigError> {
        let config: ClassConfig = serde_json::from_slice(bytes)?;
        if config.classes.is_empty() {
            return Err(ClassConfigError::Empty);
        }

        Ok(config
            .classes
            .into_iter()
            .map(|(name, entry)| (entry.id, name))
            .collect())
    }

    /// Fetches and builds the map from a fight source. One call per run.
    pub async fn load<S: FightSource>(source: &S) -> Result<Self, ClassConfigError> {
        let bytes = source.class_config().await?;
        let map = Self::from_config_json(&bytes)?;
        debug!(classes = map.len(), "class name map loaded");
        Ok(map)
    }

    /// Resolves a class code to its display name, or the placeholder for
    /// unknown codes. Never fails.
    pub fn resolve(&self, class_code: u32) -> &str {
        self.names
            .get(&class_code)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CLASS_NAME)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(u32, String)> for ClassNameMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
