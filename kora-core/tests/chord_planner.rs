use kora_core::{
    ChordDefinition, ChordQuality, InstrumentProfile, KoraLayout, PegCorrectResult, PitchClass,
    Scale, analyze_chord, best_chord_matches, choose_chord_strings, resolve,
    suggest_stable_chord,
};

/// Standard 21-string kora re-seated on C: a plain C major instrument from
/// C2 to E5 with no retuned strings.
fn c_major_table() -> Vec<PegCorrectResult> {
    let profile = InstrumentProfile::standard(21);
    resolve(&profile, &KoraLayout, PitchClass::C, Scale::Major).peg_correct
}

/// Same instrument in C major pentatonic: the two F strings are retuned to E.
fn c_pentatonic_table() -> Vec<PegCorrectResult> {
    let profile = InstrumentProfile::standard(21);
    resolve(&profile, &KoraLayout, PitchClass::C, Scale::MajorPentatonic).peg_correct
}

#[test]
fn c_major_chord_is_complete_without_detune() {
    let table = c_major_table();
    let chord = ChordDefinition::new(PitchClass::C, ChordQuality::Major);
    let result = analyze_chord(&table, &chord);

    assert!(result.is_complete());
    assert!(!result.uses_detuned_strings());
    assert!(result.missing_notes.is_empty());
    assert_eq!(
        result.matched_notes,
        vec![PitchClass::C, PitchClass::E, PitchClass::G]
    );
    // four C, three E, three G strings
    assert_eq!(result.played_strings.len(), 10);
    assert_eq!(result.open_count, 10);
    assert_eq!(result.closed_count, 0);
    // 120*3 - 0 + 5*10 - 0 - |10 - 6|
    assert_eq!(result.score, 406);
}

#[test]
fn missing_notes_are_reported_in_chord_order() {
    let table = c_major_table();
    let chord = ChordDefinition::new(PitchClass::C, ChordQuality::Dominant7);
    let result = analyze_chord(&table, &chord);
    assert!(!result.is_complete());
    assert_eq!(result.missing_notes, vec![PitchClass::A_SHARP]);
    // 120*3 - 95 + 5*10 - |10 - 6|
    assert_eq!(result.score, 311);
}

#[test]
fn detuned_strings_are_penalized() {
    let table = c_pentatonic_table();
    let chord = ChordDefinition::new(PitchClass::C, ChordQuality::Major);
    let result = analyze_chord(&table, &chord);
    assert!(result.is_complete());
    assert!(result.uses_detuned_strings());
    // the retuned F strings now sound E
    assert_eq!(result.detuned_count, 2);
    // closed B strings sound C
    assert_eq!(result.closed_count, 3);
}

#[test]
fn best_matches_rank_complete_chords_first() {
    let table = c_major_table();
    let best = best_chord_matches(&table, 5);
    assert_eq!(best.len(), 5);

    // Cmaj7 and Am7 both sound 13 strings; C comes first in enumeration
    assert_eq!(
        best[0].definition,
        ChordDefinition::new(PitchClass::C, ChordQuality::Major7)
    );
    assert_eq!(best[0].score, 538);
    assert_eq!(best[0].ranking_score(), 738);
    assert_eq!(
        best[1].definition,
        ChordDefinition::new(PitchClass::A, ChordQuality::Minor7)
    );

    let all = best_chord_matches(&table, usize::MAX);
    assert_eq!(all.len(), 12 * ChordQuality::ALL.len());
    for pair in all.windows(2) {
        assert!(pair[0].ranking_score() >= pair[1].ranking_score());
    }
    let first_incomplete = all.iter().position(|m| !m.is_complete()).unwrap();
    assert!(all[first_incomplete..].iter().all(|m| !m.is_complete()));
}

#[test]
fn stable_chord_for_an_unplayable_request() {
    let table = c_major_table();
    let desired = ChordDefinition::new(PitchClass::C_SHARP, ChordQuality::Major);
    assert!(!analyze_chord(&table, &desired).is_complete());

    let suggestion = suggest_stable_chord(&table, &desired).unwrap();
    assert_eq!(
        suggestion.definition,
        ChordDefinition::new(PitchClass::F, ChordQuality::Major)
    );
    assert!(suggestion.is_complete());
    assert!(!suggestion.uses_detuned_strings());
}

#[test]
fn stable_chord_keeps_a_playable_request() {
    let table = c_major_table();
    let desired = ChordDefinition::new(PitchClass::C, ChordQuality::Major);
    let suggestion = suggest_stable_chord(&table, &desired).unwrap();
    assert_eq!(suggestion.definition, desired);
}

#[test]
fn stable_chord_avoids_retuned_strings() {
    let table = c_pentatonic_table();
    let desired = ChordDefinition::new(PitchClass::C, ChordQuality::Major);
    let suggestion = suggest_stable_chord(&table, &desired).unwrap();
    assert_eq!(
        suggestion.definition,
        ChordDefinition::new(PitchClass::C, ChordQuality::Sus2)
    );
    assert_eq!(suggestion.detuned_count, 0);
}

#[test]
fn stable_chord_none_when_nothing_qualifies() {
    let table: Vec<PegCorrectResult> = c_major_table()
        .into_iter()
        .filter(|row| row.selected_pitch.class == PitchClass::C)
        .collect();
    let desired = ChordDefinition::new(PitchClass::C, ChordQuality::Major);
    assert!(suggest_stable_chord(&table, &desired).is_none());
}

#[test]
fn grip_of_third_and_seventh() {
    let table = c_major_table();
    let chord = ChordDefinition::new(PitchClass::C, ChordQuality::Major7);
    let grip = choose_chord_strings(&table, &chord, Some(&[4u8, 11][..]), 2);

    assert_eq!(grip.len(), 2);
    assert_eq!(grip[0].selected_pitch.class, PitchClass::B);
    assert_eq!(grip[0].selected_pitch.to_string(), "B2");
    assert_eq!(grip[1].selected_pitch.class, PitchClass::E);
    assert_eq!(grip[1].selected_pitch.to_string(), "E3");
}

#[test]
fn grip_covers_chord_before_doubling() {
    let table = c_major_table();
    let chord = ChordDefinition::new(PitchClass::C, ChordQuality::Major);
    let grip = choose_chord_strings(&table, &chord, None, 4);

    let numbers: Vec<u8> = grip.iter().map(|r| r.string_number).collect();
    // C2, G2, E3 cover the chord, then the lowest unused string C3 doubles
    assert_eq!(numbers, vec![1, 2, 5, 7]);
    let pitches: Vec<String> = grip.iter().map(|r| r.selected_pitch.to_string()).collect();
    assert_eq!(pitches, vec!["C2", "G2", "C3", "E3"]);
}

#[test]
fn grip_size_is_clamped_and_strings_unique() {
    let table = c_major_table();
    for quality in ChordQuality::ALL {
        let chord = ChordDefinition::new(PitchClass::G, quality);
        for max_notes in 0..8 {
            let grip = choose_chord_strings(&table, &chord, None, max_notes);
            assert!(grip.len() <= max_notes.clamp(1, 4));
            let mut numbers: Vec<u8> = grip.iter().map(|r| r.string_number).collect();
            numbers.sort();
            numbers.dedup();
            assert_eq!(numbers.len(), grip.len());
            for pair in grip.windows(2) {
                assert!(pair[0].selected_pitch <= pair[1].selected_pitch);
            }
        }
    }

    let chord = ChordDefinition::new(PitchClass::C, ChordQuality::Major);
    assert_eq!(choose_chord_strings(&table, &chord, None, 0).len(), 1);
    assert_eq!(choose_chord_strings(&table, &chord, None, 10).len(), 4);
}
