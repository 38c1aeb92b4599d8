//! # Musical Tuning Module
//!
//! Static interval tables for the scales and chord qualities a kora player can
//! select, and their resolution into pitch-class sets for a given root.
//!
//! ## Features
//! - Scale interval tables (diatonic modes, harmonic/melodic minor, pentatonics, blues)
//! - Chord quality tables as ordered `(offset, label)` tones
//! - Name parsing that tolerates case, spaces, hyphens and underscores
//!
//! The resolution engine never reads these tables directly; it only consumes
//! the resolved [`PitchClassSet`].

use crate::error::PitchParseError;
use crate::pitch::{PitchClass, PitchClassSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercases and strips separators so `"Major Pentatonic"`,
/// `"major-pentatonic"` and `"major_pentatonic"` compare equal.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A selectable scale, defined by its semitone offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scale {
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
}

impl Scale {
    pub const ALL: [Scale; 11] = [
        Scale::Major,
        Scale::NaturalMinor,
        Scale::HarmonicMinor,
        Scale::MelodicMinor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::MajorPentatonic,
        Scale::MinorPentatonic,
        Scale::Blues,
    ];

    pub fn intervals(self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::MajorPentatonic => &[0, 2, 4, 7, 9],
            Scale::MinorPentatonic => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::NaturalMinor => "natural-minor",
            Scale::HarmonicMinor => "harmonic-minor",
            Scale::MelodicMinor => "melodic-minor",
            Scale::Dorian => "dorian",
            Scale::Phrygian => "phrygian",
            Scale::Lydian => "lydian",
            Scale::Mixolydian => "mixolydian",
            Scale::MajorPentatonic => "major-pentatonic",
            Scale::MinorPentatonic => "minor-pentatonic",
            Scale::Blues => "blues",
        }
    }

    /// The target pitch-class set for this scale on `root`.
    pub fn pitch_classes(self, root: PitchClass) -> PitchClassSet {
        PitchClassSet::from_intervals(root, self.intervals())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = PitchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        let alias = match wanted.as_str() {
            "ionian" => Some(Scale::Major),
            "minor" | "aeolian" => Some(Scale::NaturalMinor),
            "pentatonic" => Some(Scale::MajorPentatonic),
            _ => None,
        };
        alias
            .or_else(|| {
                Scale::ALL
                    .into_iter()
                    .find(|scale| normalize_name(scale.name()) == wanted)
            })
            .ok_or_else(|| PitchParseError::UnknownName {
                kind: "scale",
                name: s.to_string(),
            })
    }
}

/// One chord member: semitone offset from the root plus its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChordTone {
    pub offset: u8,
    pub label: &'static str,
}

const fn tone(offset: u8, label: &'static str) -> ChordTone {
    ChordTone { offset, label }
}

/// The chord qualities the voicing planner knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Dominant7,
    Major7,
    Minor7,
}

impl ChordQuality {
    /// Enumeration order doubles as the tie-break order for chord rankings.
    pub const ALL: [ChordQuality; 9] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
    ];

    pub fn tones(self) -> &'static [ChordTone] {
        static MAJOR: [ChordTone; 3] = [tone(0, "R"), tone(4, "3"), tone(7, "5")];
        static MINOR: [ChordTone; 3] = [tone(0, "R"), tone(3, "b3"), tone(7, "5")];
        static DIMINISHED: [ChordTone; 3] = [tone(0, "R"), tone(3, "b3"), tone(6, "b5")];
        static AUGMENTED: [ChordTone; 3] = [tone(0, "R"), tone(4, "3"), tone(8, "#5")];
        static SUS2: [ChordTone; 3] = [tone(0, "R"), tone(2, "2"), tone(7, "5")];
        static SUS4: [ChordTone; 3] = [tone(0, "R"), tone(5, "4"), tone(7, "5")];
        static DOMINANT7: [ChordTone; 4] =
            [tone(0, "R"), tone(4, "3"), tone(7, "5"), tone(10, "b7")];
        static MAJOR7: [ChordTone; 4] = [tone(0, "R"), tone(4, "3"), tone(7, "5"), tone(11, "7")];
        static MINOR7: [ChordTone; 4] =
            [tone(0, "R"), tone(3, "b3"), tone(7, "5"), tone(10, "b7")];

        match self {
            ChordQuality::Major => &MAJOR,
            ChordQuality::Minor => &MINOR,
            ChordQuality::Diminished => &DIMINISHED,
            ChordQuality::Augmented => &AUGMENTED,
            ChordQuality::Sus2 => &SUS2,
            ChordQuality::Sus4 => &SUS4,
            ChordQuality::Dominant7 => &DOMINANT7,
            ChordQuality::Major7 => &MAJOR7,
            ChordQuality::Minor7 => &MINOR7,
        }
    }

    pub fn offsets(self) -> impl Iterator<Item = u8> {
        self.tones().iter().map(|t| t.offset)
    }

    pub fn name(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Diminished => "diminished",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Dominant7 => "dominant7",
            ChordQuality::Major7 => "major7",
            ChordQuality::Minor7 => "minor7",
        }
    }

    /// Suffix appended to the root in chord symbols (`C`, `Cm`, `Cmaj7`).
    pub fn symbol(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChordQuality {
    type Err = PitchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        let alias = match wanted.as_str() {
            "maj" => Some(ChordQuality::Major),
            "m" | "min" => Some(ChordQuality::Minor),
            "dim" => Some(ChordQuality::Diminished),
            "aug" => Some(ChordQuality::Augmented),
            "7" | "dom7" => Some(ChordQuality::Dominant7),
            "maj7" => Some(ChordQuality::Major7),
            "m7" | "min7" => Some(ChordQuality::Minor7),
            _ => None,
        };
        alias
            .or_else(|| {
                ChordQuality::ALL
                    .into_iter()
                    .find(|quality| quality.name() == wanted)
            })
            .ok_or_else(|| PitchParseError::UnknownName {
                kind: "chord quality",
                name: s.to_string(),
            })
    }
}
