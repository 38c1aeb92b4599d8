//! Plain-text rendering of resolution results for the terminal.
//!
//! Every function builds a `String` so the output can be tested without
//! capturing stdout.

use kora_core::{ChordMatch, PegCorrectResult, PitchClass, Resolution, TuningMode};
use std::fmt::{self, Write};

pub fn render_resolution(resolution: &Resolution) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "Root {}  targets {}  transpose {:+}",
        resolution.root, resolution.targets, resolution.transpose_semitones
    )?;

    writeln!(out, "\n{}", TuningMode::LeverOnly)?;
    writeln!(
        out,
        "{:>3}  {:<4} {:<5} {:<6} {:<7} {:<6}",
        "#", "role", "open", "closed", "lever", "sounds"
    )?;
    for row in &resolution.lever_only {
        let lever = row.lever.map_or("-", |state| state.label());
        let sounds = row
            .selected_pitch
            .map_or_else(|| "RETUNE".to_string(), |pitch| pitch.to_string());
        writeln!(
            out,
            "{:>3}  {:<4} {:<5} {:<6} {:<7} {:<6}",
            row.string_number,
            row.role.label(),
            row.open_pitch.to_string(),
            row.closed_pitch.to_string(),
            lever,
            sounds
        )?;
    }

    writeln!(out, "\n{}", TuningMode::PegCorrect)?;
    writeln!(
        out,
        "{:>3}  {:<4} {:<5} {:<7} {:<7} {:<6} {:>9}",
        "#", "role", "open", "retune", "lever", "sounds", "Hz"
    )?;
    for row in &resolution.peg_correct {
        let retune = if row.peg_retune_required {
            format!("{:+} {}", row.peg_retune_semitones, row.retuned_open_pitch)
        } else {
            "-".to_string()
        };
        writeln!(
            out,
            "{:>3}  {:<4} {:<5} {:<7} {:<7} {:<6} {:>9.2}",
            row.string_number,
            row.role.label(),
            row.original_open_pitch.to_string(),
            retune,
            row.lever.label(),
            row.selected_pitch.to_string(),
            row.selected_pitch.frequency_hz(row.intonation_cents)
        )?;
    }
    writeln!(out, "Strings to retune: {}", resolution.retune_count())?;

    if !resolution.conflicts.is_empty() {
        writeln!(out, "\nConflicts")?;
        for conflict in &resolution.conflicts {
            writeln!(out, "  [{}] {}", conflict.mode, conflict.detail)?;
        }
    }
    if !resolution.suggestions.is_empty() {
        writeln!(out, "\nSuggestions")?;
        for suggestion in &resolution.suggestions {
            writeln!(out, "  [{}] {}", suggestion.mode, suggestion.message)?;
        }
    }
    Ok(out)
}

fn note_list(notes: &[PitchClass]) -> String {
    if notes.is_empty() {
        return "-".to_string();
    }
    notes
        .iter()
        .map(|n| n.name())
        .collect::<Vec<_>>()
        .join(" ")
}

fn chord_line(out: &mut String, m: &ChordMatch) -> fmt::Result {
    writeln!(
        out,
        "{:<7} score {:>5}  notes {:<11} missing {:<7} strings {:>2} (open {}, closed {}, retuned {})",
        m.definition.to_string(),
        m.score,
        note_list(&m.matched_notes),
        note_list(&m.missing_notes),
        m.played_strings.len(),
        m.open_count,
        m.closed_count,
        m.detuned_count
    )
}

pub fn render_chord_matches(matches: &[ChordMatch]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if matches.is_empty() {
        out.push_str("No chords to show.\n");
    }
    for m in matches {
        chord_line(&mut out, m)?;
    }
    Ok(out)
}

/// Analysis of the requested chord, an optional stable alternative, and the
/// chosen strings lowest first.
pub fn render_grip(
    analysis: &ChordMatch,
    stable: Option<&ChordMatch>,
    grip: &[PegCorrectResult],
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    chord_line(&mut out, analysis)?;

    match stable {
        Some(s) if s.definition == analysis.definition => {
            writeln!(out, "Playable as tuned.")?;
        }
        Some(s) => {
            writeln!(out, "Stable alternative:")?;
            chord_line(&mut out, s)?;
        }
        None => {
            writeln!(out, "No stable alternative without retuned strings.")?;
        }
    }

    if grip.is_empty() {
        writeln!(out, "Grip: no strings sound this chord.")?;
        return Ok(out);
    }
    writeln!(out, "Grip:")?;
    for row in grip {
        writeln!(
            out,
            "  string {:>2} {:<4} {:<4} {}",
            row.string_number,
            row.role.label(),
            row.selected_pitch.to_string(),
            row.lever.label()
        )?;
    }
    Ok(out)
}
