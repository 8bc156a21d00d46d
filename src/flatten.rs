//! Fight record flattening.
//!
//! Turns one nested [`FightRecord`] into flat per-participant rows: winners
//! first (each with `won = true`), then losers (`won = false`), list order
//! preserved within each side. Pure and deterministic; the only lookup is
//! the class-name resolution, and misses there resolve to a placeholder
//! rather than failing the record.

use crate::classes::ClassNameMap;
use crate::record::{FightId, FightRecord, FightSide};
use serde::Serialize;

/// One participant's appearance in one fight.
///
/// This is the unit the storage layer persists; it dedupes on
/// `(fight_id, participant)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FightRow {
    pub fight_id: FightId,
    pub class_name: String,
    pub participant: String,
    pub won: bool,
    pub fought_at: String,
}

/// Flattens a fight into one row per participant.
///
/// A record with `a` winners and `b` losers yields exactly `a + b` rows,
/// all sharing the record's id and timestamp.
pub fn flatten(record: &FightRecord, classes: &ClassNameMap) -> Vec<FightRow> {
    let detail = &record.detail;
    let mut rows = Vec::with_capacity(detail.participant_count());

    let mut push_side = |side: &FightSide, won: bool| {
        for participant in &side.participants {
            rows.push(FightRow {
                fight_id: record.id.clone(),
                class_name: classes.resolve(participant.class_code).to_string(),
                participant: participant.name.clone(),
                won,
                fought_at: detail.fought_at.clone(),
            });
        }
    };

    push_side(&detail.winners, true);
    push_side(&detail.losers, false);

    rows
}
