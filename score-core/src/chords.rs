//! # Chord Practice Module
//!
//! Owns the fixed chord dictionary and tracks which member notes of a
//! randomly chosen target chord have been confirmed as played. The
//! engine only reports counts; it never formats feedback messages —
//! that belongs to whatever presentation layer sits on top.

use once_cell::sync::Lazy;
use rand::Rng;
use std::collections::HashSet;

use crate::NoteEvent;

/// A named chord and its member notes, size 3-4.
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    pub name: String,
    pub notes: Vec<NoteEvent>,
}

fn chord(name: &str, members: &[(&str, i32)]) -> Chord {
    Chord {
        name: name.to_string(),
        notes: members
            .iter()
            .map(|&(note, octave)| NoteEvent::new(note, octave))
            .collect(),
    }
}

/// The fixed ten-entry chord dictionary: major, minor, diminished and
/// seventh qualities spanning octaves 4-5.
static CHORD_DICTIONARY: Lazy<Vec<Chord>> = Lazy::new(|| {
    vec![
        chord("C Major", &[("C", 4), ("E", 4), ("G", 4)]),
        chord("D Minor", &[("D", 4), ("F", 4), ("A", 4)]),
        chord("E Minor", &[("E", 4), ("G", 4), ("B", 4)]),
        chord("F Major", &[("F", 4), ("A", 4), ("C", 5)]),
        chord("G Major", &[("G", 4), ("B", 4), ("D", 5)]),
        chord("A Minor", &[("A", 4), ("C", 5), ("E", 5)]),
        chord("B Diminished", &[("B", 4), ("D", 5), ("F", 5)]),
        chord("C7", &[("C", 4), ("E", 4), ("G", 4), ("A#", 4)]),
        chord("Am7", &[("A", 4), ("C", 5), ("E", 5), ("G", 5)]),
        chord("Dm7", &[("D", 4), ("F", 4), ("A", 4), ("C", 5)]),
    ]
});

/// The full chord dictionary, in its fixed order.
pub fn chord_dictionary() -> &'static [Chord] {
    &CHORD_DICTIONARY
}

/// Picks one chord uniformly at random from the dictionary.
pub fn select_random_chord() -> &'static Chord {
    let index = rand::thread_rng().gen_range(0..CHORD_DICTIONARY.len());
    &CHORD_DICTIONARY[index]
}

/// Session progress snapshot surfaced to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub confirmed: usize,
    pub total: usize,
    pub complete: bool,
}

/// One chord practice session.
///
/// State machine: `Inactive -> Active(target, confirmed)`;
/// [`PracticeSession::next_chord`] re-enters Active with a fresh
/// target and an empty confirmed set, [`PracticeSession::deactivate`]
/// returns to Inactive. The confirmed set is always a subset of the
/// target chord's members.
#[derive(Debug, Default)]
pub struct PracticeSession {
    target: Option<Chord>,
    confirmed: HashSet<NoteEvent>,
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates the session with a random target chord.
    pub fn activate(&mut self) {
        self.target = Some(select_random_chord().clone());
        self.confirmed.clear();
    }

    /// Deactivates the session and clears all progress.
    pub fn deactivate(&mut self) {
        self.target = None;
        self.confirmed.clear();
    }

    /// Swaps in a new random target chord, clearing progress.
    /// No-op while inactive.
    pub fn next_chord(&mut self) {
        if self.target.is_some() {
            self.activate();
        }
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// The current target chord, if the session is active.
    pub fn target(&self) -> Option<&Chord> {
        self.target.as_ref()
    }

    /// Registers a detected note against the target chord.
    ///
    /// Member notes are inserted into the confirmed set (idempotent);
    /// notes outside the chord are silently ignored, as is everything
    /// while the session is inactive.
    pub fn submit_note(&mut self, note: &NoteEvent) {
        let Some(target) = &self.target else {
            return;
        };
        if target.notes.contains(note) {
            self.confirmed.insert(note.clone());
        }
    }

    /// Counts of confirmed vs required notes for the target chord.
    /// An inactive session reports zero totals and is never complete.
    pub fn progress(&self) -> Progress {
        let total = self.target.as_ref().map_or(0, |c| c.notes.len());
        let confirmed = self.confirmed.len();
        Progress {
            confirmed,
            total,
            complete: total > 0 && confirmed == total,
        }
    }

    /// Clears confirmed notes but keeps the target chord, so the same
    /// chord can be retried.
    pub fn reset(&mut self) {
        self.confirmed.clear();
    }
}
