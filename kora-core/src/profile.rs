use crate::error::ProfileError;
use crate::pitch::{Pitch, PitchClass};
use crate::tuning::Scale;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single physical kora string.
///
/// The closed (lever-engaged) pitch is never stored: it is always exactly one
/// semitone above the open pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KoraString {
    pub string_number: u8, // 1-based, ascending with pitch
    pub open_pitch: Pitch,
    #[serde(default)]
    pub open_intonation_cents: f32,
    #[serde(default)]
    pub closed_intonation_cents: f32,
}

/// The complete tuning setup of one instrument.
/// This is the top-level object you will save to and load from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    #[serde(default)]
    pub name: String,
    pub string_count: usize,
    // Profiles emulating a fixed, lever-less instrument turn this off.
    #[serde(default = "default_closed_lever_enabled")]
    pub closed_lever_enabled: bool,
    pub strings: Vec<KoraString>,
}

fn default_closed_lever_enabled() -> bool {
    true
}

impl KoraString {
    pub fn new(string_number: u8, open_pitch: Pitch) -> Self {
        KoraString {
            string_number,
            open_pitch,
            open_intonation_cents: 0.0,
            closed_intonation_cents: 0.0,
        }
    }

    pub fn closed_pitch(&self) -> Pitch {
        self.open_pitch.plus_semitones(1)
    }

    /// A copy of this string with the open pitch (and therefore the closed
    /// pitch) moved by `semitones`. Intonation offsets are carried unchanged.
    pub fn transposed(&self, semitones: i32) -> KoraString {
        KoraString {
            open_pitch: self.open_pitch.plus_semitones(semitones),
            ..self.clone()
        }
    }
}

impl InstrumentProfile {
    /// The traditional F-major ("Silaba") tuning: an F2 bass string, then the
    /// F major scale upwards from C3. 21 strings end on A5, 22 on Bb5; any
    /// other count keeps climbing the same scale.
    ///
    /// String numbers are `u8`, so counts above 255 are clamped to 255.
    pub fn standard(string_count: usize) -> Self {
        let string_count = string_count.min(u8::MAX as usize);
        let f_major = Scale::Major.pitch_classes(PitchClass::F);
        let bass = Pitch::new(PitchClass::F, 2);
        let mut pitches = vec![bass];
        let mut next = Pitch::new(PitchClass::C, 3);
        while pitches.len() < string_count {
            pitches.push(next);
            next = next.plus_semitones(1);
            while !f_major.contains(next.class) {
                next = next.plus_semitones(1);
            }
        }
        pitches.truncate(string_count);

        InstrumentProfile {
            name: format!("Standard {}-string kora", string_count),
            string_count,
            closed_lever_enabled: true,
            strings: (1..=u8::MAX)
                .zip(pitches)
                .map(|(number, pitch)| KoraString::new(number, pitch))
                .collect(),
        }
    }

    /// Checks the structural invariants: at least one string, one entry per
    /// declared string, numbered `1..=string_count` in order.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.strings.is_empty() || self.string_count == 0 {
            return Err(ProfileError::Empty);
        }
        if self.strings.len() != self.string_count {
            return Err(ProfileError::CountMismatch {
                declared: self.string_count,
                actual: self.strings.len(),
            });
        }
        for (index, string) in self.strings.iter().enumerate() {
            if string.string_number as usize != index + 1 {
                return Err(ProfileError::Misnumbered {
                    index,
                    expected: index + 1,
                    found: string.string_number,
                });
            }
        }
        Ok(())
    }
}

/// Saves an instrument profile to a JSON file.
///
/// # Arguments
/// * `profile` - The profile to save
/// * `path` - Destination file (e.g., "kora_profile.json")
pub fn save_profile(profile: &InstrumentProfile, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json_string = serde_json::to_string_pretty(profile)?;
    fs::write(path, json_string)
        .with_context(|| format!("writing profile to {}", path.display()))?;
    log::info!("[PROFILE] Saved '{}' to {}", profile.name, path.display());
    Ok(())
}

/// Loads and validates an instrument profile from a JSON file.
///
/// # Returns
/// * `Ok(InstrumentProfile)` - A profile that passed [`InstrumentProfile::validate`]
/// * `Err(e)` - File I/O error, JSON error, or a structural [`ProfileError`]
pub fn load_profile(path: impl AsRef<Path>) -> Result<InstrumentProfile> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading profile from {}", path.display()))?;
    let profile: InstrumentProfile = serde_json::from_str(&data)
        .with_context(|| format!("parsing profile {}", path.display()))?;
    profile
        .validate()
        .with_context(|| format!("invalid profile {}", path.display()))?;
    log::info!(
        "[PROFILE] Loaded '{}' ({} strings) from {}",
        profile.name,
        profile.string_count,
        path.display()
    );
    Ok(profile)
}
