//! # Detection Pipeline Module
//!
//! Per-frame driver logic: consult the optional remote detection
//! service first, fall back to the local [`crate::analyzer`], gate the
//! result to the supported instrument range, map it to a note and
//! debounce the event stream.
//!
//! The local path is always available as a synchronous, non-suspending
//! fallback; the remote call is the only step that may block, and it
//! is bounded by the client's timeouts. Remote reachability is modeled
//! as an explicit [`BackendHealth`] value fed through the pure
//! [`next_health`] transition — not as a hidden flag flipped inside
//! the client.

use std::time::Instant;

use anyhow::Result;
use log::{debug, info, warn};

use crate::debounce::NoteDebouncer;
use crate::{analyzer, notes, NoteEvent, PitchEstimate};

/// One analysis buffer plus its sample rate, owned by the caller for
/// the duration of a single [`DetectionPipeline::process_frame`] call.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }
}

/// The seam for a remote pitch service (score-net's client implements
/// this; tests substitute fakes).
pub trait RemoteDetector {
    /// One bounded detection request. A transport-level failure is an
    /// `Err`; a reachable backend that heard only silence is `Ok(None)`.
    fn detect_pitch(&mut self, samples: &[f32], sample_rate: u32) -> Result<Option<PitchEstimate>>;

    /// Cheap reachability probe, used before retrying a backend that
    /// previously failed.
    fn health_check(&mut self) -> bool;
}

/// Last-known reachability of the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendHealth {
    Online,
    Offline,
}

/// Pure health transition: `call` is `Some(succeeded)` when a remote
/// call was made this cycle, `None` when the remote was not consulted.
pub fn next_health(previous: BackendHealth, call: Option<bool>) -> BackendHealth {
    match call {
        None => previous,
        Some(true) => BackendHealth::Online,
        Some(false) => BackendHealth::Offline,
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    /// The pitch heard in this frame, if any.
    pub estimate: Option<PitchEstimate>,
    /// The debounced note event, present only when the debouncer
    /// forwarded it. This is what the practice engine consumes.
    pub event: Option<NoteEvent>,
}

/// Synchronous per-frame detection driver.
///
/// Holds the only two pieces of cross-call state in the hot path: the
/// last-known backend health and the debouncer record. Single-owner,
/// single-writer; safe to drive from one polling thread.
pub struct DetectionPipeline {
    remote: Option<Box<dyn RemoteDetector>>,
    health: BackendHealth,
    debouncer: NoteDebouncer,
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::local_only()
    }
}

impl DetectionPipeline {
    /// A pipeline that only ever runs the local analyzer.
    pub fn local_only() -> Self {
        Self {
            remote: None,
            health: BackendHealth::Offline,
            debouncer: NoteDebouncer::default(),
        }
    }

    /// A pipeline that consults `remote` first on every frame.
    /// Starts optimistically Online; the first failed call downgrades
    /// it and the local path covers that same cycle.
    pub fn with_remote(remote: Box<dyn RemoteDetector>) -> Self {
        Self {
            remote: Some(remote),
            health: BackendHealth::Online,
            debouncer: NoteDebouncer::default(),
        }
    }

    /// Replaces the default debounce window.
    pub fn with_debouncer(mut self, debouncer: NoteDebouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    /// Last-known health of the remote service.
    pub fn health(&self) -> BackendHealth {
        self.health
    }

    /// Clears the debounce state, e.g. when a listening session restarts.
    pub fn restart(&mut self) {
        self.debouncer.restart();
    }

    /// Processes one audio frame.
    ///
    /// `now` is the caller-supplied timestamp for debouncing; the
    /// pipeline never reads the clock itself.
    pub fn process_frame(&mut self, frame: &AudioFrame, now: Instant) -> FrameOutcome {
        let mut estimate = self.try_remote(frame);

        // Local fallback covers both an absent/unreachable backend and
        // a reachable one that reported no pitch.
        if estimate.is_none() {
            estimate = analyzer::detect_pitch(&frame.samples, frame.sample_rate)
                .filter(|&freq| {
                    let usable = notes::in_range(freq);
                    if !usable {
                        debug!("discarding out-of-range frequency {freq:.1} Hz");
                    }
                    usable
                })
                .map(notes::frequency_to_note);
        }

        let event = estimate.as_ref().and_then(|pitch| {
            let event = pitch.event();
            self.debouncer.accept(&event, now).then_some(event)
        });

        FrameOutcome { estimate, event }
    }

    fn try_remote(&mut self, frame: &AudioFrame) -> Option<PitchEstimate> {
        let remote = self.remote.as_mut()?;

        if self.health == BackendHealth::Offline {
            if !remote.health_check() {
                return None;
            }
            info!("remote pitch service is reachable again");
            self.health = next_health(self.health, Some(true));
        }

        match remote.detect_pitch(&frame.samples, frame.sample_rate) {
            Ok(pitch) => {
                self.health = next_health(self.health, Some(true));
                pitch
            }
            Err(err) => {
                warn!("remote pitch detection failed, using local analyzer: {err}");
                self.health = next_health(self.health, Some(false));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::VecDeque;
    use std::f32::consts::PI;
    use std::time::Duration;

    fn sine_frame(frequency: f32, sample_rate: u32, len: usize) -> AudioFrame {
        let samples = (0..len)
            .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioFrame::new(samples, sample_rate)
    }

    struct FakeRemote {
        responses: VecDeque<Result<Option<PitchEstimate>>>,
        healthy: bool,
        detect_calls: usize,
    }

    impl FakeRemote {
        fn new(responses: Vec<Result<Option<PitchEstimate>>>) -> Self {
            Self {
                responses: responses.into(),
                healthy: true,
                detect_calls: 0,
            }
        }
    }

    impl RemoteDetector for FakeRemote {
        fn detect_pitch(&mut self, _: &[f32], _: u32) -> Result<Option<PitchEstimate>> {
            self.detect_calls += 1;
            self.responses.pop_front().unwrap_or(Ok(None))
        }

        fn health_check(&mut self) -> bool {
            self.healthy
        }
    }

    #[test]
    fn local_path_detects_a_sine() {
        let mut pipeline = DetectionPipeline::local_only();
        let frame = sine_frame(440.0, 44100, 800);

        let outcome = pipeline.process_frame(&frame, Instant::now());
        let estimate = outcome.estimate.expect("pitch expected");
        assert_eq!(estimate.note, "A");
        assert_eq!(estimate.octave, 4);
        assert!(estimate.cents.abs() <= 5);
        assert_eq!(outcome.event, Some(NoteEvent::new("A", 4)));
    }

    #[test]
    fn silent_frame_yields_nothing() {
        let mut pipeline = DetectionPipeline::local_only();
        let frame = AudioFrame::new(vec![0.0; 1024], 44100);

        let outcome = pipeline.process_frame(&frame, Instant::now());
        assert!(outcome.estimate.is_none());
        assert!(outcome.event.is_none());
    }

    #[test]
    fn out_of_range_frequency_is_discarded() {
        // Exact 64-sample period at 1 MHz resolves to 15625 Hz, well
        // above C8, so the caller boundary drops it.
        let mut pipeline = DetectionPipeline::local_only();
        let samples: Vec<f32> = (0..256)
            .map(|i| (2.0 * PI * (i % 64) as f32 / 64.0).sin() * 0.8)
            .collect();
        let frame = AudioFrame::new(samples, 1_000_000);

        let outcome = pipeline.process_frame(&frame, Instant::now());
        assert!(outcome.estimate.is_none());
    }

    #[test]
    fn remote_estimate_takes_precedence() {
        let remote_pitch = notes::frequency_to_note(261.63);
        let remote = FakeRemote::new(vec![Ok(Some(remote_pitch.clone()))]);
        let mut pipeline = DetectionPipeline::with_remote(Box::new(remote));

        // The frame itself carries an A, but the remote answer wins.
        let frame = sine_frame(440.0, 44100, 800);
        let outcome = pipeline.process_frame(&frame, Instant::now());
        assert_eq!(outcome.estimate, Some(remote_pitch));
        assert_eq!(pipeline.health(), BackendHealth::Online);
    }

    #[test]
    fn remote_failure_falls_back_locally_same_cycle() {
        let remote = FakeRemote::new(vec![Err(anyhow!("connection refused"))]);
        let mut pipeline = DetectionPipeline::with_remote(Box::new(remote));

        let frame = sine_frame(440.0, 44100, 800);
        let outcome = pipeline.process_frame(&frame, Instant::now());

        let estimate = outcome.estimate.expect("local fallback expected");
        assert_eq!(estimate.note, "A");
        assert_eq!(pipeline.health(), BackendHealth::Offline);
    }

    #[test]
    fn offline_backend_is_probed_before_reuse() {
        let mut remote = FakeRemote::new(vec![Err(anyhow!("boom"))]);
        remote.healthy = false;
        let mut pipeline = DetectionPipeline::with_remote(Box::new(remote));

        let frame = sine_frame(440.0, 44100, 800);
        // First frame: failed call flips health to Offline.
        pipeline.process_frame(&frame, Instant::now());
        assert_eq!(pipeline.health(), BackendHealth::Offline);

        // Second frame: probe fails, so no detect call is made and the
        // local analyzer still answers.
        let outcome = pipeline.process_frame(&frame, Instant::now());
        assert_eq!(pipeline.health(), BackendHealth::Offline);
        assert!(outcome.estimate.is_some());
    }

    #[test]
    fn healthy_probe_restores_the_remote() {
        let remote_pitch = notes::frequency_to_note(392.0);
        let remote = FakeRemote::new(vec![
            Err(anyhow!("boom")),
            Ok(Some(remote_pitch.clone())),
        ]);
        let mut pipeline = DetectionPipeline::with_remote(Box::new(remote));

        let frame = sine_frame(440.0, 44100, 800);
        pipeline.process_frame(&frame, Instant::now());
        assert_eq!(pipeline.health(), BackendHealth::Offline);

        // Probe succeeds, remote is consulted again and wins.
        let outcome = pipeline.process_frame(&frame, Instant::now());
        assert_eq!(pipeline.health(), BackendHealth::Online);
        assert_eq!(outcome.estimate, Some(remote_pitch));
    }

    #[test]
    fn repeated_note_is_debounced_but_still_estimated() {
        let mut pipeline = DetectionPipeline::local_only();
        let frame = sine_frame(440.0, 44100, 800);
        let start = Instant::now();

        let first = pipeline.process_frame(&frame, start);
        assert!(first.event.is_some());

        let second = pipeline.process_frame(&frame, start + Duration::from_millis(50));
        assert!(second.estimate.is_some());
        assert!(second.event.is_none());
    }

    #[test]
    fn health_transition_is_pure() {
        use BackendHealth::*;
        assert_eq!(next_health(Online, None), Online);
        assert_eq!(next_health(Offline, None), Offline);
        assert_eq!(next_health(Online, Some(false)), Offline);
        assert_eq!(next_health(Offline, Some(true)), Online);
        assert_eq!(next_health(Online, Some(true)), Online);
        assert_eq!(next_health(Offline, Some(false)), Offline);
    }
}
