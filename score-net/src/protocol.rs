//! Wire protocol for the remote pitch service.
//!
//! One [`Request`] per frame, answered by exactly one [`Response`]:
//! a health probe plus the detection, chord-analysis and
//! note-conversion endpoints.

use serde::{Deserialize, Serialize};

use score_core::PitchEstimate;

/// Client-to-server messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Reachability probe.
    Health,
    /// Detect the dominant pitch in one audio buffer.
    DetectPitch {
        samples: Vec<f32>,
        #[serde(rename = "sampleRate")]
        sample_rate: u32,
    },
    /// Map a set of already-detected frequencies to note names.
    AnalyzeChord { frequencies: Vec<f32> },
    /// Inverse conversion, mirroring the local note mapper.
    NoteToFrequency { note: String, octave: i32 },
}

/// Server-to-client messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Health {
        status: String,
    },
    Pitch {
        success: bool,
        pitch: Option<PitchEstimate>,
    },
    Notes {
        success: bool,
        notes: Vec<PitchEstimate>,
    },
    Frequency {
        success: bool,
        frequency: Option<f32>,
    },
    /// Malformed or unserviceable request.
    Error {
        message: String,
    },
}
