// score-core/src/lib.rs

//! The core logic for the sound2score trainer.
//! This crate is responsible for pitch detection, note mapping,
//! chord practice tracking and per-frame detection plumbing. It is
//! completely headless and contains no capture, GUI or network code.

use serde::{Deserialize, Serialize};

pub mod analyzer;
pub mod chords;
pub mod debounce;
pub mod notes;
pub mod pipeline;

/// A single successful pitch detection, fresh per analysis frame.
// Serde names match the wire shape the remote service speaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEstimate {
    /// The detected fundamental frequency in Hz.
    pub frequency: f32,
    /// Pitch class name from the chromatic table ("C" .. "B").
    pub note: String,
    /// Octave number (A4 sits in octave 4).
    pub octave: i32,
    /// Signed deviation from the nearest tempered pitch, in cents.
    pub cents: i32,
    /// MIDI note number (A4 = 69).
    #[serde(rename = "midiNote")]
    pub midi_note: i32,
}

impl PitchEstimate {
    /// Combined label like `"A4"` or `"C#3"`.
    pub fn full_note(&self) -> String {
        format!("{}{}", self.note, self.octave)
    }

    /// The (pitch class, octave) pair the debouncer and practice
    /// engine operate on.
    pub fn event(&self) -> NoteEvent {
        NoteEvent {
            note: self.note.clone(),
            octave: self.octave,
        }
    }
}

/// A (pitch class, octave) pair derived from a `PitchEstimate`.
///
/// This is the unit of currency between the debouncer and the chord
/// practice engine; the timestamp travels alongside as an argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    pub note: String,
    pub octave: i32,
}

impl NoteEvent {
    pub fn new(note: impl Into<String>, octave: i32) -> Self {
        Self {
            note: note.into(),
            octave,
        }
    }

    /// Combined label like `"A4"`.
    pub fn label(&self) -> String {
        format!("{}{}", self.note, self.octave)
    }
}
