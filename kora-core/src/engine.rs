//! # Tuning Resolution Engine
//!
//! Resolves an instrument profile against a target pitch-class set into two
//! per-string tables:
//!
//! - **Lever-only**: which strings already reach the target with their open or
//!   closed lever position, and which would need a peg change.
//! - **Peg-correct**: a playable answer for every string, retuning the peg by
//!   the smallest possible amount where the lever alone is not enough.
//!
//! Before either table is built the whole instrument is transposed rigidly so
//! that the lowest Left-side string sits on the requested root.

use crate::pitch::{Pitch, PitchClass, PitchClassSet};
use crate::profile::{InstrumentProfile, KoraString};
use crate::topology::{Side, StringRole, Topology};
use crate::tuning::Scale;
use crate::voicing::{self, VoicingConflict, VoicingSuggestion};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Octaves searched on each side of a string's current octave when retuning.
const PEG_SEARCH_OCTAVES: i32 = 2;

/// Lever position. `Open < Closed`: Open wins every tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeverState {
    Open,
    Closed,
}

impl LeverState {
    pub fn other(self) -> LeverState {
        match self {
            LeverState::Open => LeverState::Closed,
            LeverState::Closed => LeverState::Open,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeverState::Open => "OPEN",
            LeverState::Closed => "CLOSED",
        }
    }

    /// The pitch `string` sounds in this lever position.
    pub fn pitch_of(self, string: &KoraString) -> Pitch {
        match self {
            LeverState::Open => string.open_pitch,
            LeverState::Closed => string.closed_pitch(),
        }
    }

    pub fn intonation_of(self, string: &KoraString) -> f32 {
        match self {
            LeverState::Open => string.open_intonation_cents,
            LeverState::Closed => string.closed_intonation_cents,
        }
    }
}

impl fmt::Display for LeverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which of the two result tables a conflict or suggestion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TuningMode {
    LeverOnly,
    PegCorrect,
}

impl fmt::Display for TuningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningMode::LeverOnly => f.write_str("lever-only"),
            TuningMode::PegCorrect => f.write_str("peg-correct"),
        }
    }
}

/// One row of the lever-only table. Pitches are after root anchoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeverOnlyResult {
    pub string_number: u8,
    pub role: StringRole,
    pub open_pitch: Pitch,
    pub closed_pitch: Pitch,
    pub lever: Option<LeverState>,
    pub selected_pitch: Option<Pitch>,
    pub peg_retune_required: bool,
    pub intonation_cents: f32,
}

/// One row of the peg-correct table. Always playable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PegCorrectResult {
    pub string_number: u8,
    pub role: StringRole,
    pub original_open_pitch: Pitch,
    pub original_closed_pitch: Pitch,
    pub retuned_open_pitch: Pitch,
    pub retuned_closed_pitch: Pitch,
    pub lever: LeverState,
    pub selected_pitch: Pitch,
    /// `retuned_open - original_open` in semitones; negative means tune down.
    pub peg_retune_semitones: i32,
    pub peg_retune_required: bool,
    pub intonation_cents: f32,
}

/// Everything computed for one (profile, root, target) request.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub root: PitchClass,
    pub targets: PitchClassSet,
    /// Rigid transposition applied to every string, in `(-6, 6]`.
    pub transpose_semitones: i32,
    pub lever_only: Vec<LeverOnlyResult>,
    pub peg_correct: Vec<PegCorrectResult>,
    pub conflicts: Vec<VoicingConflict>,
    pub suggestions: Vec<VoicingSuggestion>,
}

impl Resolution {
    pub fn conflicts_for(&self, mode: TuningMode) -> impl Iterator<Item = &VoicingConflict> {
        self.conflicts.iter().filter(move |c| c.mode == mode)
    }

    /// Number of strings that need a peg change to play the target.
    pub fn retune_count(&self) -> usize {
        self.peg_correct
            .iter()
            .filter(|row| row.peg_retune_required)
            .count()
    }
}

/// Resolves `profile` for `scale` on `root`.
///
/// # Panics
/// Never for the built-in scales; see [`resolve_targets`].
pub fn resolve(
    profile: &InstrumentProfile,
    topology: &dyn Topology,
    root: PitchClass,
    scale: Scale,
) -> Resolution {
    resolve_targets(profile, topology, root, scale.pitch_classes(root))
}

/// Resolves `profile` against an already-resolved target pitch-class set.
///
/// # Arguments
/// * `profile` - The instrument as currently tuned
/// * `topology` - String layout used for ordering and side assignment
/// * `root` - The root the left bass string is re-anchored on
/// * `targets` - Allowed pitch classes; must not be empty
///
/// # Panics
/// If `targets` is empty. Callers are required to resolve a non-empty scale
/// or chord before calling the engine.
pub fn resolve_targets(
    profile: &InstrumentProfile,
    topology: &dyn Topology,
    root: PitchClass,
    targets: PitchClassSet,
) -> Resolution {
    assert!(
        !targets.is_empty(),
        "tuning resolution requires a non-empty target pitch-class set"
    );

    let transpose = root_transpose(profile, topology, root);
    let strings = transposed_strings(profile, transpose);
    let closed_enabled = profile.closed_lever_enabled;

    let mut lever_only = Vec::with_capacity(strings.len());
    let mut peg_correct = Vec::with_capacity(strings.len());
    for string in strings.iter() {
        let role = topology.role_for(profile.string_count, string.string_number);
        let lever = lever_only_choice(string, targets, closed_enabled);
        lever_only.push(lever_only_row(string, role, lever));
        peg_correct.push(peg_correct_row(string, role, lever, targets, closed_enabled));
    }
    lever_only.sort_by_key(|row| (row.role, row.string_number));
    peg_correct.sort_by_key(|row| (row.role, row.string_number));

    let lever_conflicts = voicing::detect_conflicts(TuningMode::LeverOnly, &lever_only);
    let peg_conflicts = voicing::detect_conflicts(TuningMode::PegCorrect, &peg_correct);
    let suggestions: Vec<VoicingSuggestion> =
        voicing::suggest_lever_fixes(&lever_conflicts, &lever_only, closed_enabled)
            .into_iter()
            .chain(voicing::suggest_peg_fixes(&peg_conflicts))
            .collect();

    log::debug!(
        "[ENGINE] root {} targets {} transpose {:+}: {} lever misses, {} peg retunes, {} conflicts",
        root,
        targets,
        transpose,
        lever_only.iter().filter(|r| r.peg_retune_required).count(),
        peg_correct.iter().filter(|r| r.peg_retune_required).count(),
        lever_conflicts.len() + peg_conflicts.len()
    );

    let mut conflicts = lever_conflicts;
    conflicts.extend(peg_conflicts);

    Resolution {
        root,
        targets,
        transpose_semitones: transpose,
        lever_only,
        peg_correct,
        conflicts,
        suggestions,
    }
}

/// Semitones that move the lowest Left-side string onto `root`, folded into
/// `(-6, 6]`. Falls back to the first string when no string is on the Left.
pub fn root_transpose(
    profile: &InstrumentProfile,
    topology: &dyn Topology,
    root: PitchClass,
) -> i32 {
    let left_bass = profile
        .strings
        .iter()
        .map(|s| (topology.role_for(profile.string_count, s.string_number), s))
        .filter(|(role, _)| role.side == Side::Left)
        .min_by_key(|(role, _)| role.position_from_low)
        .map(|(_, s)| s)
        .or_else(|| profile.strings.first());

    let Some(bass) = left_bass else {
        return 0;
    };
    let delta = bass.open_pitch.class.interval_to(root) as i32;
    if delta > 6 { delta - 12 } else { delta }
}

fn transposed_strings(profile: &InstrumentProfile, semitones: i32) -> Cow<'_, [KoraString]> {
    if semitones == 0 {
        Cow::Borrowed(&profile.strings)
    } else {
        Cow::Owned(
            profile
                .strings
                .iter()
                .map(|s| s.transposed(semitones))
                .collect(),
        )
    }
}

/// Open if it lands in the target set, else Closed if allowed and it lands.
pub fn lever_only_choice(
    string: &KoraString,
    targets: PitchClassSet,
    closed_lever_enabled: bool,
) -> Option<LeverState> {
    if targets.contains(string.open_pitch.class) {
        Some(LeverState::Open)
    } else if closed_lever_enabled && targets.contains(string.closed_pitch().class) {
        Some(LeverState::Closed)
    } else {
        None
    }
}

fn lever_only_row(string: &KoraString, role: StringRole, lever: Option<LeverState>) -> LeverOnlyResult {
    LeverOnlyResult {
        string_number: string.string_number,
        role,
        open_pitch: string.open_pitch,
        closed_pitch: string.closed_pitch(),
        lever,
        selected_pitch: lever.map(|l| l.pitch_of(string)),
        peg_retune_required: lever.is_none(),
        intonation_cents: lever.map_or(0.0, |l| l.intonation_of(string)),
    }
}

/// A possible peg retune. Field order is the selection order: smallest
/// distance, then Open before Closed, then the lower retuned pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RetuneCandidate {
    distance: i32,
    lever_penalty: u8,
    retuned_open_abs: i32,
    lever: LeverState,
}

/// Finds the smallest peg retune that lets `string` sound a target pitch
/// class, returning the retuned open pitch and the lever to use.
///
/// Searches every target class in the octaves `[octave - 2, octave + 2]`
/// around the string's open pitch. Each (class, octave) yields an
/// open-landing candidate and, when the closed lever is enabled, a
/// closed-landing one tuned a semitone lower.
///
/// # Panics
/// If `targets` is empty.
pub fn peg_retune(
    string: &KoraString,
    targets: PitchClassSet,
    closed_lever_enabled: bool,
) -> (Pitch, LeverState) {
    let original_abs = string.open_pitch.absolute_semitone();
    let octave = string.open_pitch.octave;

    let best = (octave - PEG_SEARCH_OCTAVES..=octave + PEG_SEARCH_OCTAVES)
        .flat_map(|o| targets.iter().map(move |class| Pitch::new(class, o)))
        .flat_map(|landing| {
            let open_landing = landing.absolute_semitone();
            let closed_landing = closed_lever_enabled.then_some(open_landing - 1);
            [
                Some((open_landing, LeverState::Open)),
                closed_landing.map(|abs| (abs, LeverState::Closed)),
            ]
        })
        .flatten()
        .map(|(retuned_open_abs, lever)| RetuneCandidate {
            distance: (retuned_open_abs - original_abs).abs(),
            lever_penalty: match lever {
                LeverState::Open => 0,
                LeverState::Closed => 1,
            },
            retuned_open_abs,
            lever,
        })
        .min()
        .expect("peg retune search over a non-empty target set always has a candidate");

    (Pitch::from_absolute(best.retuned_open_abs), best.lever)
}

fn peg_correct_row(
    string: &KoraString,
    role: StringRole,
    lever: Option<LeverState>,
    targets: PitchClassSet,
    closed_enabled: bool,
) -> PegCorrectResult {
    let (retuned_open, lever) = match lever {
        Some(lever) => (string.open_pitch, lever),
        None => peg_retune(string, targets, closed_enabled),
    };
    let retuned = KoraString {
        open_pitch: retuned_open,
        ..string.clone()
    };
    let semitones = retuned_open.absolute_semitone() - string.open_pitch.absolute_semitone();
    if semitones != 0 {
        log::trace!(
            "[ENGINE] string {} peg {} -> {} ({:+}), lever {}",
            string.string_number,
            string.open_pitch,
            retuned_open,
            semitones,
            lever
        );
    }

    PegCorrectResult {
        string_number: string.string_number,
        role,
        original_open_pitch: string.open_pitch,
        original_closed_pitch: string.closed_pitch(),
        retuned_open_pitch: retuned_open,
        retuned_closed_pitch: retuned.closed_pitch(),
        lever,
        selected_pitch: lever.pitch_of(&retuned),
        peg_retune_semitones: semitones,
        peg_retune_required: semitones != 0,
        intonation_cents: lever.intonation_of(&retuned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::KoraLayout;

    fn string(number: u8, pitch: &str) -> KoraString {
        KoraString::new(number, pitch.parse().unwrap())
    }

    fn pentatonic_c() -> PitchClassSet {
        Scale::MajorPentatonic.pitch_classes(PitchClass::C)
    }

    #[test]
    fn test_root_transpose_folds_into_half_octave() {
        let profile = InstrumentProfile::standard(21);
        // F2 bass: C is 7 up, folded to 5 down
        assert_eq!(root_transpose(&profile, &KoraLayout, PitchClass::C), -5);
        assert_eq!(root_transpose(&profile, &KoraLayout, PitchClass::F), 0);
        // B is 6 up (tritone stays positive)
        assert_eq!(root_transpose(&profile, &KoraLayout, PitchClass::B), 6);
        assert_eq!(root_transpose(&profile, &KoraLayout, PitchClass::E), -1);
    }

    #[test]
    fn test_zero_transpose_borrows() {
        let profile = InstrumentProfile::standard(21);
        assert!(matches!(transposed_strings(&profile, 0), Cow::Borrowed(_)));
        assert!(matches!(transposed_strings(&profile, 3), Cow::Owned(_)));
    }

    #[test]
    fn test_lever_only_prefers_open() {
        let targets: PitchClassSet = [PitchClass::C, PitchClass::C_SHARP].into_iter().collect();
        let c3 = string(1, "C3");
        assert_eq!(lever_only_choice(&c3, targets, true), Some(LeverState::Open));
        let b2 = string(1, "B2");
        assert_eq!(lever_only_choice(&b2, targets, true), Some(LeverState::Closed));
        assert_eq!(lever_only_choice(&b2, targets, false), None);
    }

    #[test]
    fn test_peg_retune_f_to_e_in_pentatonic() {
        // F is equidistant from E (open) and F# (closed landing for G); open wins
        let (retuned, lever) = peg_retune(&string(1, "F2"), pentatonic_c(), true);
        assert_eq!(retuned.to_string(), "E2");
        assert_eq!(lever, LeverState::Open);
    }

    #[test]
    fn test_peg_retune_prefers_lower_pitch_on_full_tie() {
        // Only C and D allowed, no closed lever: C#3 is 1 from both C3 and D3
        let targets: PitchClassSet = [PitchClass::C, PitchClass::D].into_iter().collect();
        let (retuned, lever) = peg_retune(&string(1, "C#3"), targets, false);
        assert_eq!(retuned.to_string(), "C3");
        assert_eq!(lever, LeverState::Open);
    }

    #[test]
    fn test_peg_retune_open_landing_beats_closed_landing() {
        // D#3 -> D3 open is 1 away, the closed landing C#3 is 2 away
        let targets: PitchClassSet = [PitchClass::D].into_iter().collect();
        let (retuned, lever) = peg_retune(&string(1, "D#3"), targets, true);
        assert_eq!(retuned.to_string(), "D3");
        assert_eq!(lever, LeverState::Open);
    }

    #[test]
    fn test_peg_retune_uses_closed_landing_when_closer() {
        // C#3 -> E3 open is 3 away; tuning to D#3 and closing reaches E3 in 2
        let targets: PitchClassSet = [PitchClass::E].into_iter().collect();
        let (retuned, lever) = peg_retune(&string(1, "C#3"), targets, true);
        assert_eq!(retuned.to_string(), "D#3");
        assert_eq!(lever, LeverState::Closed);

        let (retuned, lever) = peg_retune(&string(1, "C#3"), targets, false);
        assert_eq!(retuned.to_string(), "E3");
        assert_eq!(lever, LeverState::Open);
    }

    #[test]
    #[should_panic(expected = "non-empty target")]
    fn test_empty_targets_panic() {
        let profile = InstrumentProfile::standard(21);
        resolve_targets(&profile, &KoraLayout, PitchClass::C, PitchClassSet::new());
    }

    #[test]
    fn test_tables_sorted_left_then_right() {
        let profile = InstrumentProfile::standard(21);
        let resolution = resolve(&profile, &KoraLayout, PitchClass::C, Scale::Major);
        let roles: Vec<StringRole> = resolution.peg_correct.iter().map(|r| r.role).collect();
        let mut sorted = roles.clone();
        sorted.sort();
        assert_eq!(roles, sorted);
        assert_eq!(resolution.lever_only[0].string_number, 1);
        assert_eq!(resolution.lever_only[11].role.side, Side::Right);
    }

    #[test]
    fn test_intonation_follows_selected_lever() {
        let mut profile = InstrumentProfile::standard(21);
        profile.strings[0].open_intonation_cents = 3.0;
        profile.strings[0].closed_intonation_cents = -2.0;
        // F root, so no transpose: F2 bass plays open in F major
        let resolution = resolve(&profile, &KoraLayout, PitchClass::F, Scale::Major);
        let bass = &resolution.lever_only[0];
        assert_eq!(bass.lever, Some(LeverState::Open));
        assert_eq!(bass.intonation_cents, 3.0);

        // F# root moves the whole instrument up a semitone, so the bass stays open
        let resolution = resolve(&profile, &KoraLayout, PitchClass::F_SHARP, Scale::Major);
        assert_eq!(resolution.transpose_semitones, 1);
        assert_eq!(resolution.lever_only[0].intonation_cents, 3.0);
    }
}
