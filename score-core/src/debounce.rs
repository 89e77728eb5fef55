//! Detection event debouncing.
//!
//! A sustained tone is re-detected on every analysis frame, tens of
//! times per second; without suppression one held key would register
//! as dozens of note events. A *changed* note always passes
//! immediately, a *repeated* note only after the window has elapsed —
//! which is why the rule is an OR, not an AND.

use std::time::{Duration, Instant};

use crate::NoteEvent;

/// Default minimum interval before an identical note is accepted again.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Suppresses duplicate note registrations from consecutive frames.
///
/// Process-local, single-owner state; it governs suppression only and
/// never alters the musical data itself.
#[derive(Debug)]
pub struct NoteDebouncer {
    window: Duration,
    last: Option<(NoteEvent, Instant)>,
}

impl Default for NoteDebouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl NoteDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Decides whether a note event should be forwarded.
    ///
    /// Forwards when the note differs from the last forwarded one OR
    /// enough time has passed since it; forwarding updates the stored
    /// state, suppression leaves it untouched.
    pub fn accept(&mut self, note: &NoteEvent, at: Instant) -> bool {
        let forward = match &self.last {
            None => true,
            Some((last_note, last_at)) => {
                note != last_note || at.saturating_duration_since(*last_at) > self.window
            }
        };
        if forward {
            self.last = Some((note.clone(), at));
        }
        forward
    }

    /// Forgets the last forwarded event.
    pub fn restart(&mut self) {
        self.last = None;
    }
}
