//! # Voicing Conflict Module
//!
//! On a kora each hand's strings are expected to rise in pitch from the bass
//! upwards. A tuning plan that makes a higher-position string sound the same
//! as or lower than its neighbour is still playable but disorienting; this
//! module finds those crossings and proposes lever changes that undo them.

use crate::engine::{LeverOnlyResult, LeverState, PegCorrectResult, TuningMode};
use crate::pitch::Pitch;
use crate::topology::{Side, StringRole};
use serde::Serialize;

/// A pitch crossing between two neighbouring strings on one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoicingConflict {
    pub mode: TuningMode,
    pub side: Side,
    pub lower_string: u8,
    pub higher_string: u8,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoicingSuggestion {
    pub mode: TuningMode,
    pub message: String,
}

/// A result row the conflict scanner can read.
pub trait VoicedRow {
    fn string_number(&self) -> u8;
    fn role(&self) -> StringRole;
    fn sounding_pitch(&self) -> Option<Pitch>;
}

impl VoicedRow for LeverOnlyResult {
    fn string_number(&self) -> u8 {
        self.string_number
    }

    fn role(&self) -> StringRole {
        self.role
    }

    fn sounding_pitch(&self) -> Option<Pitch> {
        self.selected_pitch
    }
}

impl VoicedRow for PegCorrectResult {
    fn string_number(&self) -> u8 {
        self.string_number
    }

    fn role(&self) -> StringRole {
        self.role
    }

    fn sounding_pitch(&self) -> Option<Pitch> {
        Some(self.selected_pitch)
    }
}

/// Scans each side's adjacent string pairs, lowest position first, and
/// reports every pair where the higher-position string does not sound
/// strictly higher. Pairs where either string has no selected pitch are
/// skipped.
///
/// # Arguments
/// * `mode` - Table the rows come from, copied into each conflict
/// * `rows` - Result rows in any order; they are grouped by side and sorted
///   by position here
pub fn detect_conflicts<R: VoicedRow>(mode: TuningMode, rows: &[R]) -> Vec<VoicingConflict> {
    let mut conflicts = Vec::new();
    for side in [Side::Left, Side::Right] {
        let mut side_rows: Vec<&R> = rows.iter().filter(|r| r.role().side == side).collect();
        side_rows.sort_by_key(|r| r.role().position_from_low);

        for pair in side_rows.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let (Some(low_pitch), Some(high_pitch)) = (lower.sounding_pitch(), higher.sounding_pitch())
            else {
                continue;
            };
            if high_pitch > low_pitch {
                continue;
            }
            conflicts.push(VoicingConflict {
                mode,
                side,
                lower_string: lower.string_number(),
                higher_string: higher.string_number(),
                detail: format!(
                    "String {} ({}) sounds {} but string {} ({}) below it sounds {}",
                    higher.string_number(),
                    higher.role().label(),
                    high_pitch,
                    lower.string_number(),
                    lower.role().label(),
                    low_pitch
                ),
            });
        }
    }
    conflicts
}

/// Proposes a lever change for the first lever-only conflict.
///
/// The lower string is tried first: switching it to its other lever position
/// must bring it strictly below the higher string. Then the higher string is
/// tried the other way round. The closed position is only offered when the
/// closed lever is enabled. Returns a generic suggestion when neither string
/// can fix the crossing or either string is absent from `rows`, and `None`
/// when there are no lever-only conflicts.
pub fn suggest_lever_fixes(
    conflicts: &[VoicingConflict],
    rows: &[LeverOnlyResult],
    closed_lever_enabled: bool,
) -> Option<VoicingSuggestion> {
    let first = conflicts
        .iter()
        .find(|c| c.mode == TuningMode::LeverOnly)?;
    let lower = rows.iter().find(|r| r.string_number == first.lower_string);
    let higher = rows.iter().find(|r| r.string_number == first.higher_string);

    let alternative = |row: &LeverOnlyResult| -> Option<(LeverState, Pitch)> {
        let other = row.lever?.other();
        if other == LeverState::Closed && !closed_lever_enabled {
            return None;
        }
        let pitch = match other {
            LeverState::Open => row.open_pitch,
            LeverState::Closed => row.closed_pitch,
        };
        Some((other, pitch))
    };

    // Rows missing from the table still get the generic advice.
    let fix = lower.zip(higher).and_then(|(lower, higher)| {
        alternative(lower)
            .filter(|&(_, alt)| higher.selected_pitch.is_some_and(|high| alt < high))
            .map(|(lever, _)| (lower.string_number, lever))
            .or_else(|| {
                alternative(higher)
                    .filter(|&(_, alt)| lower.selected_pitch.is_some_and(|low| alt > low))
                    .map(|(lever, _)| (higher.string_number, lever))
            })
    });

    let message = match fix {
        Some((string_number, lever)) => format!(
            "Set string {} to {} to restore rising pitch on the {} side.",
            string_number, lever, first.side
        ),
        None => format!(
            "Use peg-correct mode or change the root/scale to resolve the crossing between strings {} and {} on the {} side.",
            first.lower_string, first.higher_string, first.side
        ),
    };
    Some(VoicingSuggestion {
        mode: TuningMode::LeverOnly,
        message,
    })
}

/// Peg-correct crossings are not auto-resolved: the retune search already
/// picked the nearest pitch for every string.
pub fn suggest_peg_fixes(conflicts: &[VoicingConflict]) -> Option<VoicingSuggestion> {
    let count = conflicts
        .iter()
        .filter(|c| c.mode == TuningMode::PegCorrect)
        .count();
    if count == 0 {
        return None;
    }
    Some(VoicingSuggestion {
        mode: TuningMode::PegCorrect,
        message: format!(
            "Transpose and recalculate: {} pitch crossing(s) remain after peg correction.",
            count
        ),
    })
}
