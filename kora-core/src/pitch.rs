//! # Pitch Arithmetic Module
//!
//! Pitch classes, octave-qualified pitches and pitch-class sets for the kora
//! engine. Everything here is integer semitone arithmetic; frequencies are only
//! derived for display and tuner targets.
//!
//! ## Features
//! - Pitch classes modulo 12 with sharp-preferred spelling
//! - Absolute-semitone ordering and floor-division transposition
//! - Note name parsing (`"F2"`, `"Bb3"`, `"C#4"`, `"C-1"`)
//! - Equal temperament frequencies with an intonation offset in cents

use crate::error::PitchParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Absolute semitone of A4, the 440 Hz reference.
const A4_ABSOLUTE: i32 = 4 * 12 + 9;

/// One of the twelve note identities, independent of octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const C_SHARP: PitchClass = PitchClass(1);
    pub const D: PitchClass = PitchClass(2);
    pub const D_SHARP: PitchClass = PitchClass(3);
    pub const E: PitchClass = PitchClass(4);
    pub const F: PitchClass = PitchClass(5);
    pub const F_SHARP: PitchClass = PitchClass(6);
    pub const G: PitchClass = PitchClass(7);
    pub const G_SHARP: PitchClass = PitchClass(8);
    pub const A: PitchClass = PitchClass(9);
    pub const A_SHARP: PitchClass = PitchClass(10);
    pub const B: PitchClass = PitchClass(11);

    /// Builds a pitch class from any semitone count, wrapping modulo 12.
    pub fn new(semitone: i32) -> Self {
        PitchClass(semitone.rem_euclid(12) as u8)
    }

    pub fn semitone(self) -> u8 {
        self.0
    }

    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::new(self.0 as i32 + semitones)
    }

    /// Upward interval from `self` to `other`, in `0..12`.
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.0 + 12 - self.0) % 12
    }

    /// Shortest distance around the pitch-class circle, in `0..=6`.
    pub fn circular_distance(self, other: PitchClass) -> u8 {
        let diff = (self.0 as i32 - other.0 as i32).unsigned_abs() % 12;
        diff.min(12 - diff) as u8
    }

    /// Canonical display spelling (sharps preferred).
    pub fn name(self) -> &'static str {
        SHARP_NAMES[self.0 as usize]
    }

    /// All twelve pitch classes, C first.
    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..12).map(PitchClass)
    }
}

/// Splits a note name into its natural letter semitone, the accidental
/// offset, and the unparsed remainder.
fn split_note_name(text: &str) -> Result<(i32, i32, &str), PitchParseError> {
    let letter = text.chars().next().ok_or(PitchParseError::Empty)?;
    let natural = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(PitchParseError::UnknownLetter(text.to_string())),
    };

    let mut accidental = 0;
    let mut rest = &text[letter.len_utf8()..];
    while let Some(ch) = rest.chars().next() {
        match ch {
            '#' | '♯' => accidental += 1,
            'b' | '♭' => accidental -= 1,
            _ => break,
        }
        rest = &rest[ch.len_utf8()..];
    }
    Ok((natural, accidental, rest))
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = PitchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (natural, accidental, rest) = split_note_name(trimmed)?;
        if !rest.is_empty() {
            return Err(PitchParseError::UnknownLetter(trimmed.to_string()));
        }
        Ok(PitchClass::new(natural + accidental))
    }
}

impl TryFrom<String> for PitchClass {
    type Error = PitchParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PitchClass> for String {
    fn from(value: PitchClass) -> Self {
        value.name().to_string()
    }
}

/// A pitch class in a specific octave (scientific pitch notation, C4 = middle C).
///
/// Ordering and equality follow the absolute semitone, so `B#3` style
/// enharmonics never arise: the octave is always renormalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i32,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i32) -> Self {
        Pitch { class, octave }
    }

    /// Rebuilds a pitch from its absolute semitone using floor division, so
    /// negative values land in negative octaves.
    pub fn from_absolute(absolute: i32) -> Self {
        Pitch {
            class: PitchClass::new(absolute),
            octave: absolute.div_euclid(12),
        }
    }

    /// `octave * 12 + pitch_class`, the key for all ordering and distance checks.
    pub fn absolute_semitone(self) -> i32 {
        self.octave * 12 + self.class.semitone() as i32
    }

    pub fn plus_semitones(self, semitones: i32) -> Self {
        Pitch::from_absolute(self.absolute_semitone() + semitones)
    }

    /// Equal temperament frequency (A4 = 440 Hz) shifted by `cents`.
    ///
    /// # Arguments
    /// * `cents` - Intonation offset; 100 cents = 1 semitone
    ///
    /// # Returns
    /// * Target frequency in Hz
    pub fn frequency_hz(self, cents: f32) -> f32 {
        let semitones = (self.absolute_semitone() - A4_ABSOLUTE) as f32 + cents / 100.0;
        440.0 * 2.0_f32.powf(semitones / 12.0)
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.absolute_semitone().cmp(&other.absolute_semitone())
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

impl FromStr for Pitch {
    type Err = PitchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (natural, accidental, rest) = split_note_name(trimmed)?;
        let octave: i32 = rest
            .parse()
            .map_err(|_| PitchParseError::InvalidOctave(trimmed.to_string()))?;
        // Accidentals may cross the octave line: Cb4 is B3, B#3 is C4.
        Ok(Pitch::from_absolute(octave * 12 + natural + accidental))
    }
}

impl TryFrom<String> for Pitch {
    type Error = PitchParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(value: Pitch) -> Self {
        value.to_string()
    }
}

/// A set of pitch classes stored as a 12-bit mask. Iteration is ascending
/// from C.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub fn new() -> Self {
        PitchClassSet(0)
    }

    /// Applies each interval to `root` modulo 12.
    pub fn from_intervals(root: PitchClass, intervals: &[u8]) -> Self {
        intervals
            .iter()
            .map(|&interval| root.transpose(interval as i32))
            .collect()
    }

    pub fn insert(&mut self, class: PitchClass) {
        self.0 |= 1 << class.semitone();
    }

    pub fn contains(self, class: PitchClass) -> bool {
        self.0 & (1 << class.semitone()) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = PitchClass> {
        PitchClass::all().filter(move |&class| self.contains(class))
    }

    pub fn intersection(self, other: PitchClassSet) -> PitchClassSet {
        PitchClassSet(self.0 & other.0)
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<T: IntoIterator<Item = PitchClass>>(iter: T) -> Self {
        let mut set = PitchClassSet::new();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl fmt::Debug for PitchClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|c| c.name())).finish()
    }
}

impl fmt::Display for PitchClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.name()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

impl Serialize for PitchClassSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
