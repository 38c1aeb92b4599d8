// kora-core/src/lib.rs

//! The core logic for the kora tuning assistant.
//! This crate resolves an instrument's strings against a scale or chord,
//! plans peg retunes, detects voicing conflicts and picks chord grips.
//! It is completely headless and performs no I/O outside of
//! profile loading and saving.

pub mod chord;
pub mod engine;
pub mod error;
pub mod pitch;
pub mod profile;
pub mod topology;
pub mod tuning;
pub mod voicing;

pub use chord::{
    ChordDefinition, ChordMatch, analyze_chord, best_chord_matches, choose_chord_strings,
    suggest_stable_chord,
};
pub use engine::{
    LeverOnlyResult, LeverState, PegCorrectResult, Resolution, TuningMode, resolve,
    resolve_targets,
};
pub use error::{PitchParseError, ProfileError};
pub use pitch::{Pitch, PitchClass, PitchClassSet};
pub use profile::{InstrumentProfile, KoraString, load_profile, save_profile};
pub use topology::{KoraLayout, Side, StringRole, Topology};
pub use tuning::{ChordQuality, Scale};
pub use voicing::{VoicingConflict, VoicingSuggestion};
