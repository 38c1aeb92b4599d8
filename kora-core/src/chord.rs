//! # Chord Voicing Planner
//!
//! Scores chords against a peg-correct table, ranks every root/quality
//! combination, suggests a stable alternative that needs no retuned strings,
//! and picks a small playable grip of strings for a chord.
//!
//! ## Scoring
//! `120*matched - 95*missing + 5*played - 35*detuned - |played - 6|`
//!
//! Six sounding strings is treated as a comfortable strum; complete chords get
//! a flat bonus when ranked so they always come first.

use crate::engine::{LeverState, PegCorrectResult};
use crate::pitch::{PitchClass, PitchClassSet};
use crate::tuning::ChordQuality;
use serde::{Deserialize, Serialize};
use std::fmt;

const MATCHED_WEIGHT: i32 = 120;
const MISSING_WEIGHT: i32 = 95;
const PLAYED_WEIGHT: i32 = 5;
const DETUNED_WEIGHT: i32 = 35;
const COMFORTABLE_STRUM: i32 = 6;
const COMPLETE_BONUS: i32 = 200;

/// Largest number of strings in a chord grip.
pub const MAX_GRIP_NOTES: usize = 4;

/// A chord to analyze: a root plus a quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordDefinition {
    pub root: PitchClass,
    pub quality: ChordQuality,
}

impl ChordDefinition {
    pub fn new(root: PitchClass, quality: ChordQuality) -> Self {
        ChordDefinition { root, quality }
    }

    /// Chord notes in quality order with duplicates collapsed.
    pub fn pitch_classes(&self) -> Vec<PitchClass> {
        let mut classes = Vec::with_capacity(self.quality.tones().len());
        for offset in self.quality.offsets() {
            let class = self.root.transpose(offset as i32);
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        classes
    }

    pub fn pitch_class_set(&self) -> PitchClassSet {
        self.quality
            .offsets()
            .map(|offset| self.root.transpose(offset as i32))
            .collect()
    }

    /// Every root (C upwards) crossed with every quality, root-major.
    pub fn all() -> impl Iterator<Item = ChordDefinition> {
        PitchClass::all().flat_map(|root| {
            ChordQuality::ALL
                .into_iter()
                .map(move |quality| ChordDefinition::new(root, quality))
        })
    }
}

impl fmt::Display for ChordDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality.symbol())
    }
}

/// How well a tuning table voices one chord. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordMatch {
    pub definition: ChordDefinition,
    pub matched_notes: Vec<PitchClass>,
    pub missing_notes: Vec<PitchClass>,
    /// String numbers sounding a chord note, in table order.
    pub played_strings: Vec<u8>,
    pub open_count: usize,
    pub closed_count: usize,
    pub detuned_count: usize,
    pub score: i32,
}

impl ChordMatch {
    pub fn is_complete(&self) -> bool {
        self.missing_notes.is_empty()
    }

    pub fn uses_detuned_strings(&self) -> bool {
        self.detuned_count > 0
    }

    /// The score used for ranking: complete chords get a flat bonus.
    pub fn ranking_score(&self) -> i32 {
        if self.is_complete() {
            self.score + COMPLETE_BONUS
        } else {
            self.score
        }
    }
}

/// Scores `definition` against the peg-correct `table`.
///
/// Every row whose selected pitch class is a chord note counts as played.
pub fn analyze_chord(table: &[PegCorrectResult], definition: &ChordDefinition) -> ChordMatch {
    let chord_notes = definition.pitch_classes();
    let chord_set = definition.pitch_class_set();
    let played: Vec<&PegCorrectResult> = table
        .iter()
        .filter(|row| chord_set.contains(row.selected_pitch.class))
        .collect();

    let sounding: PitchClassSet = played.iter().map(|row| row.selected_pitch.class).collect();
    let (matched_notes, missing_notes): (Vec<PitchClass>, Vec<PitchClass>) = chord_notes
        .into_iter()
        .partition(|&class| sounding.contains(class));

    let open_count = played
        .iter()
        .filter(|row| row.lever == LeverState::Open)
        .count();
    let detuned_count = played.iter().filter(|row| row.peg_retune_required).count();

    let played_count = played.len() as i32;
    let score = MATCHED_WEIGHT * matched_notes.len() as i32
        - MISSING_WEIGHT * missing_notes.len() as i32
        + PLAYED_WEIGHT * played_count
        - DETUNED_WEIGHT * detuned_count as i32
        - (played_count - COMFORTABLE_STRUM).abs();

    ChordMatch {
        definition: *definition,
        matched_notes,
        missing_notes,
        played_strings: played.iter().map(|row| row.string_number).collect(),
        open_count,
        closed_count: played.len() - open_count,
        detuned_count,
        score,
    }
}

/// The `limit` best chords over every root and quality, best first.
///
/// Ranking uses [`ChordMatch::ranking_score`]; equal scores keep root-major
/// enumeration order (C before C#, qualities in [`ChordQuality::ALL`] order).
pub fn best_chord_matches(table: &[PegCorrectResult], limit: usize) -> Vec<ChordMatch> {
    let mut matches: Vec<ChordMatch> = ChordDefinition::all()
        .map(|definition| analyze_chord(table, &definition))
        .collect();
    matches.sort_by_key(|m| std::cmp::Reverse(m.ranking_score()));
    matches.truncate(limit);
    matches
}

/// The chord closest to `desired` that is complete, sounds at least one
/// string, and needs no retuned strings.
///
/// Candidates are scored `120*overlap + 25*quality_bonus - 6*root_distance +
/// played`, where `overlap` counts shared pitch classes with `desired`,
/// `quality_bonus` is 2 for the same quality, and `root_distance` is the
/// circular semitone distance between roots. The first best candidate in
/// enumeration order wins.
pub fn suggest_stable_chord(
    table: &[PegCorrectResult],
    desired: &ChordDefinition,
) -> Option<ChordMatch> {
    let desired_set = desired.pitch_class_set();
    let closeness = |candidate: &ChordMatch| -> i32 {
        let definition = candidate.definition;
        let overlap = definition.pitch_class_set().intersection(desired_set).len() as i32;
        let quality_bonus = if definition.quality == desired.quality { 2 } else { 0 };
        let root_distance = definition.root.circular_distance(desired.root) as i32;
        120 * overlap + 25 * quality_bonus - 6 * root_distance + candidate.played_strings.len() as i32
    };

    let mut best: Option<(i32, ChordMatch)> = None;
    for candidate in ChordDefinition::all().map(|d| analyze_chord(table, &d)) {
        if !candidate.is_complete()
            || candidate.uses_detuned_strings()
            || candidate.played_strings.is_empty()
        {
            continue;
        }
        let value = closeness(&candidate);
        if best.as_ref().is_none_or(|(best_value, _)| value > *best_value) {
            best = Some((value, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Picks at most `max_notes` strings (clamped into `1..=4`) that voice
/// `definition`, lowest pitch first.
///
/// # Arguments
/// * `table` - Peg-correct rows to choose from
/// * `definition` - Chord whose root anchors `included_offsets`
/// * `included_offsets` - Semitone offsets from the root to voice; `None`
///   means every tone of the chord quality
/// * `max_notes` - Requested grip size
///
/// The first pass takes the lowest string of each distinct pitch class so the
/// chord is covered before anything is doubled. The second pass fills any
/// remaining slots with the lowest unused strings.
pub fn choose_chord_strings(
    table: &[PegCorrectResult],
    definition: &ChordDefinition,
    included_offsets: Option<&[u8]>,
    max_notes: usize,
) -> Vec<PegCorrectResult> {
    let max_notes = max_notes.clamp(1, MAX_GRIP_NOTES);
    let wanted = match included_offsets {
        Some(offsets) => PitchClassSet::from_intervals(definition.root, offsets),
        None => definition.pitch_class_set(),
    };

    let mut candidates: Vec<&PegCorrectResult> = table
        .iter()
        .filter(|row| wanted.contains(row.selected_pitch.class))
        .collect();
    candidates.sort_by_key(|row| row.selected_pitch.absolute_semitone());

    let mut chosen: Vec<&PegCorrectResult> = Vec::with_capacity(max_notes);
    let mut covered = PitchClassSet::new();
    for &row in &candidates {
        if chosen.len() >= max_notes {
            break;
        }
        if !covered.contains(row.selected_pitch.class) {
            covered.insert(row.selected_pitch.class);
            chosen.push(row);
        }
    }
    for &row in &candidates {
        if chosen.len() >= max_notes {
            break;
        }
        if !chosen.iter().any(|c| c.string_number == row.string_number) {
            chosen.push(row);
        }
    }

    chosen.sort_by_key(|row| row.selected_pitch.absolute_semitone());
    chosen.truncate(max_notes);
    chosen.into_iter().cloned().collect()
}
