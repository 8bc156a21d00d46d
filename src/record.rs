//! Wire-level fight record types.
//!
//! The herald's minified detail endpoint returns one JSON document per
//! fight, keyed with single-letter field names. The types here give that
//! document an explicit schema so that every field access downstream is
//! checked once, at the boundary: a document that does not match the schema
//! is rejected as malformed instead of surfacing as a missing-field panic
//! deep inside the flattener.
//!
//! Wire shape:
//!
//! ```text
//! {
//!   "s": "<timestamp>",
//!   "a": { "p": [ { "n": "<name>", "c": <class code> }, ... ] },
//!   "b": { "p": [ ... ] }
//! }
//! ```
//!
//! Side `"a"` holds the winners, side `"b"` the losers. The fight id is not
//! part of the document; it is the identifier the fetch was issued for and
//! gets attached when a [`FightRecord`] is built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier naming one fight on the herald.
///
/// Ids are supplied by the caller (from the herald's fight listing) and are
/// never generated by this crate. The inner string has no structure this
/// crate relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FightId(String);

impl FightId {
    /// Creates an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FightId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FightId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One participant within a side of a fight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Participant {
    /// Character name.
    #[serde(rename = "n")]
    pub name: String,

    /// Numeric class code, resolved to a display name during flattening.
    #[serde(rename = "c")]
    pub class_code: u32,
}

/// One side of a fight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FightSide {
    #[serde(rename = "p")]
    pub participants: Vec<Participant>,
}

/// The validated detail document for one fight.
///
/// Unknown extra fields in the wire document are ignored; missing required
/// fields fail deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FightDetail {
    /// When the fight happened, as reported by the herald. Kept opaque;
    /// interpretation is left to the storage layer.
    #[serde(rename = "s")]
    pub fought_at: String,

    /// The winning side.
    #[serde(rename = "a")]
    pub winners: FightSide,

    /// The losing side.
    #[serde(rename = "b")]
    pub losers: FightSide,
}

impl FightDetail {
    /// Parses and structurally validates a raw detail payload.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Total participants across both sides.
    pub fn participant_count(&self) -> usize {
        self.winners.participants.len() + self.losers.participants.len()
    }
}

/// A successfully fetched fight: the id the fetch was issued for plus its
/// validated detail document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FightRecord {
    pub id: FightId,
    pub detail: FightDetail,
}

impl FightRecord {
    pub fn new(id: FightId, detail: FightDetail) -> Self {
        Self { id, detail }
    }
}
