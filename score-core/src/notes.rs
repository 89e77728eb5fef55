//! # Note Mapping Module
//!
//! Pure, stateless conversion between frequency and musical notation
//! based on equal temperament with A4 = 440 Hz.
//!
//! ## Features
//! - Frequency to (pitch class, octave, cents, MIDI index) mapping
//! - Inverse (pitch class, octave) to frequency conversion
//! - Supported-range gate for the 88-key span (A0 to C8)
//!
//! The two conversions are exact inverses for any representable
//! (pitch class, octave) pair: round-tripping through
//! [`note_to_frequency`] and [`frequency_to_note`] reproduces the
//! note with a cents deviation of zero.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::PitchEstimate;

/// The twelve-entry chromatic table, starting at C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Reference pitch: A4 in Hz, MIDI note 69.
pub const A4_FREQUENCY: f32 = 440.0;

/// Lowest supported frequency: A0.
pub const MIN_FREQUENCY: f32 = 27.5;

/// Highest supported frequency: C8.
pub const MAX_FREQUENCY: f32 = 4186.0;

/// Static map for quick pitch-class name to chromatic index lookups.
static NOTE_INDEX: Lazy<BTreeMap<&'static str, i32>> = Lazy::new(|| {
    NOTE_NAMES
        .iter()
        .enumerate()
        .map(|(i, &name)| (name, i as i32))
        .collect()
});

/// Whether a frequency falls inside the supported instrument range.
pub fn in_range(frequency: f32) -> bool {
    (MIN_FREQUENCY..=MAX_FREQUENCY).contains(&frequency)
}

/// Maps a frequency to the nearest tempered pitch.
///
/// `note_num = 12 * log2(f / 440)` counts semitones away from A4; the
/// nearest integer picks the MIDI note, and the fractional remainder
/// becomes the signed cents deviation.
///
/// # Arguments
/// * `frequency` - Input frequency in Hz; must be positive, a
///   non-positive value is a caller bug (debug-asserted)
///
/// # Returns
/// * The nearest pitch with its octave, cents deviation and MIDI index
pub fn frequency_to_note(frequency: f32) -> PitchEstimate {
    debug_assert!(
        frequency > 0.0,
        "frequency_to_note requires a positive frequency, got {frequency}"
    );

    // The log runs in f64 so an exactly tempered input cannot drift a
    // hair below its integer semitone and floor down to -1 cents.
    let note_num = 12.0 * (frequency as f64 / A4_FREQUENCY as f64).log2();
    let nearest = note_num.round();
    let midi_note = nearest as i32 + 69;

    let octave = midi_note.div_euclid(12) - 1;
    let note = NOTE_NAMES[midi_note.rem_euclid(12) as usize];

    // Snap tolerance sits above the ~1e-4 cent wobble an f32 round
    // trip through note_to_frequency can introduce.
    let deviation = (note_num - nearest) * 100.0;
    let cents = if deviation.abs() < 1e-3 {
        0
    } else {
        deviation.floor() as i32
    };

    PitchEstimate {
        frequency,
        note: note.to_string(),
        octave,
        cents,
        midi_note,
    }
}

/// Converts a (pitch class, octave) pair back to a frequency.
///
/// # Arguments
/// * `note` - Pitch class name, one of the twelve chromatic names
/// * `octave` - Octave number (A4 sits in octave 4)
///
/// # Returns
/// * `Some(frequency)` - Equal-temperament frequency in Hz
/// * `None` - The pitch class is not one of the twelve names
pub fn note_to_frequency(note: &str, octave: i32) -> Option<f32> {
    let index = *NOTE_INDEX.get(note)?;
    let midi_note = (octave + 1) * 12 + index;
    let frequency = A4_FREQUENCY as f64 * 2f64.powf((midi_note - 69) as f64 / 12.0);
    Some(frequency as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_maps_to_midi_69() {
        let pitch = frequency_to_note(440.0);
        assert_eq!(pitch.note, "A");
        assert_eq!(pitch.octave, 4);
        assert_eq!(pitch.cents, 0);
        assert_eq!(pitch.midi_note, 69);
        assert_eq!(pitch.full_note(), "A4");
    }

    #[test]
    fn middle_c_from_name() {
        let freq = note_to_frequency("C", 4).unwrap();
        assert!((freq - 261.63).abs() < 0.01, "got {freq}");
    }

    #[test]
    fn unknown_pitch_class_is_rejected() {
        assert_eq!(note_to_frequency("H", 4), None);
        assert_eq!(note_to_frequency("Db", 4), None);
        assert_eq!(note_to_frequency("", 4), None);
    }

    #[test]
    fn sharp_side_deviation_is_positive() {
        // 445 Hz is just under 20 cents sharp of A4.
        let pitch = frequency_to_note(445.0);
        assert_eq!(pitch.note, "A");
        assert_eq!(pitch.octave, 4);
        assert!(pitch.cents > 0 && pitch.cents < 50, "got {}", pitch.cents);
    }

    #[test]
    fn flat_side_deviation_is_negative() {
        let pitch = frequency_to_note(435.0);
        assert_eq!(pitch.note, "A");
        assert!(pitch.cents < 0, "got {}", pitch.cents);
    }

    #[test]
    fn round_trip_is_exact_for_all_classes_and_octaves() {
        for octave in 0..=8 {
            for name in NOTE_NAMES {
                let freq = note_to_frequency(name, octave).unwrap();
                let pitch = frequency_to_note(freq);
                assert_eq!(pitch.note, name, "octave {octave}");
                assert_eq!(pitch.octave, octave, "note {name}");
                assert_eq!(pitch.cents, 0, "{name}{octave}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "positive frequency")]
    fn non_positive_frequency_is_a_caller_bug() {
        frequency_to_note(0.0);
    }

    #[test]
    fn range_gate_matches_a0_and_c8() {
        assert!(in_range(27.5));
        assert!(in_range(4186.0));
        assert!(in_range(440.0));
        assert!(!in_range(27.4));
        assert!(!in_range(4187.0));
    }
}
