//! # Kora - Tuning Resolution Command Line
//!
//! Thin front-end over `kora-core`. It loads and saves instrument profiles,
//! runs the resolution engine for a root and scale, and prints the resulting
//! tables, chord rankings and chord grips.
//!
//! ## Commands
//! - **init**: write a standard 21/22-string profile to JSON
//! - **resolve**: lever-only and peg-correct tables, conflicts, suggestions
//! - **chords**: best-scoring chords for the peg-correct table
//! - **grip**: analyze one chord, suggest a stable alternative, pick strings

mod report;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use kora_core::{
    ChordDefinition, ChordQuality, InstrumentProfile, KoraLayout, PitchClass, Resolution, Scale,
    analyze_chord, best_chord_matches, choose_chord_strings, load_profile, resolve, save_profile,
    suggest_stable_chord,
};
use std::path::{Path, PathBuf};

/// Kora tuning resolution and chord voicing
#[derive(Parser, Debug)]
#[command(name = "kora", version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a standard kora profile
    Init {
        /// Destination JSON file
        path: PathBuf,

        /// Number of strings
        #[arg(long, default_value_t = 21)]
        strings: usize,

        /// Emulate a fixed instrument without the closed lever position
        #[arg(long)]
        no_closed_lever: bool,
    },
    /// Resolve a profile against a root and scale
    Resolve {
        /// Instrument profile JSON file
        profile: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Print the full resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rank every chord against the peg-correct table
    Chords {
        /// Instrument profile JSON file
        profile: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Number of chords to print
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Analyze one chord and choose strings to play it
    Grip {
        /// Instrument profile JSON file
        profile: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Chord root, e.g. C or F#
        #[arg(long)]
        chord_root: PitchClass,

        /// Chord quality, e.g. major, m7, sus4
        #[arg(long, default_value = "major")]
        quality: ChordQuality,

        /// Semitone offsets from the chord root to voice (default: all chord tones)
        #[arg(long, value_delimiter = ',')]
        offsets: Vec<u8>,

        /// Grip size, clamped to 1..=4
        #[arg(long, default_value_t = 4)]
        max_notes: usize,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Root note the bass string is re-seated on
    #[arg(long, default_value = "C")]
    root: PitchClass,

    /// Scale name, e.g. major, minor-pentatonic, dorian
    #[arg(long, default_value = "major")]
    scale: Scale,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::debug!("[MAIN] {:?}", cli.command);
    run(cli.command)
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init {
            path,
            strings,
            no_closed_lever,
        } => {
            if strings == 0 || strings > u8::MAX as usize {
                bail!("string count must be between 1 and {} (got {})", u8::MAX, strings);
            }
            let mut profile = InstrumentProfile::standard(strings);
            profile.closed_lever_enabled = !no_closed_lever;
            save_profile(&profile, &path)?;
            println!("Wrote {} to {}", profile.name, path.display());
        }
        Commands::Resolve {
            profile,
            target,
            json,
        } => {
            let resolution = resolve_profile(&profile, &target)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                print!("{}", report::render_resolution(&resolution)?);
            }
        }
        Commands::Chords {
            profile,
            target,
            limit,
        } => {
            let resolution = resolve_profile(&profile, &target)?;
            let matches = best_chord_matches(&resolution.peg_correct, limit);
            print!("{}", report::render_chord_matches(&matches)?);
        }
        Commands::Grip {
            profile,
            target,
            chord_root,
            quality,
            offsets,
            max_notes,
        } => {
            let resolution = resolve_profile(&profile, &target)?;
            let table = &resolution.peg_correct;
            let chord = ChordDefinition::new(chord_root, quality);
            let included = (!offsets.is_empty()).then_some(offsets.as_slice());

            let analysis = analyze_chord(table, &chord);
            let stable = suggest_stable_chord(table, &chord);
            let grip = choose_chord_strings(table, &chord, included, max_notes);
            print!(
                "{}",
                report::render_grip(&analysis, stable.as_ref(), &grip)?
            );
        }
    }
    Ok(())
}

fn resolve_profile(path: &Path, target: &TargetArgs) -> Result<Resolution> {
    let profile = load_profile(path)?;
    if !KoraLayout::has_builtin_layout(profile.string_count) {
        log::warn!(
            "[MAIN] No built-in layout for {} strings, alternating strings left and right",
            profile.string_count
        );
    }
    Ok(resolve(&profile, &KoraLayout, target.root, target.scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve_defaults() {
        let cli = Cli::try_parse_from(["kora", "resolve", "kora.json"]).unwrap();
        match cli.command {
            Commands::Resolve { target, json, .. } => {
                assert_eq!(target.root, PitchClass::C);
                assert_eq!(target.scale, Scale::Major);
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_grip_offsets() {
        let cli = Cli::try_parse_from([
            "kora",
            "-vv",
            "grip",
            "kora.json",
            "--root",
            "Bb",
            "--scale",
            "minor-pentatonic",
            "--chord-root",
            "F#",
            "--quality",
            "maj7",
            "--offsets",
            "4,11",
            "--max-notes",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Grip {
                target,
                chord_root,
                quality,
                offsets,
                max_notes,
                ..
            } => {
                assert_eq!(target.root, PitchClass::A_SHARP);
                assert_eq!(target.scale, Scale::MinorPentatonic);
                assert_eq!(chord_root, PitchClass::F_SHARP);
                assert_eq!(quality, ChordQuality::Major7);
                assert_eq!(offsets, vec![4, 11]);
                assert_eq!(max_notes, 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_scale() {
        let result = Cli::try_parse_from(["kora", "chords", "kora.json", "--scale", "bebop"]);
        assert!(result.is_err());
    }
}
