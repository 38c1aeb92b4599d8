//! Typed errors raised at the input boundary (note names, table names and
//! instrument profiles). The resolution engine itself has no error paths.

use thiserror::Error;

/// Failure to turn user text into a pitch, pitch class, scale or chord quality.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchParseError {
    #[error("empty note name")]
    Empty,
    #[error("unknown note letter in {0:?}")]
    UnknownLetter(String),
    #[error("invalid octave in {0:?}")]
    InvalidOctave(String),
    #[error("unknown {kind} name {name:?}")]
    UnknownName { kind: &'static str, name: String },
}

/// Structural problems with an instrument profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile has no strings")]
    Empty,
    #[error("profile declares {declared} strings but lists {actual}")]
    CountMismatch { declared: usize, actual: usize },
    #[error("expected string number {expected} at index {index}, found {found}")]
    Misnumbered {
        index: usize,
        expected: usize,
        found: u8,
    },
}
