//! # Signal Analyzer Module
//!
//! Decides whether a clear periodic signal is present in an audio
//! buffer and, if so, estimates its fundamental frequency with a
//! lag-search correlation sweep.
//!
//! ## Features
//! - RMS loudness gate to skip silence and noise-floor frames
//! - Difference-based similarity score over candidate lags
//! - Rising-edge candidate acceptance biased toward the first strong
//!   periodicity peak
//! - Branch-light O(N²) search bounded by the frame length

/// Minimum RMS amplitude for a buffer (normalized to [-1, 1]) to be
/// worth searching at all.
pub const RMS_FLOOR: f32 = 0.01;

/// Similarity score a lag must clear to count as a candidate.
pub const CORRELATION_THRESHOLD: f32 = 0.9;

/// Estimates the fundamental frequency of one audio buffer.
///
/// The search computes, for each lag `offset` in `1..len/2`, the
/// similarity `1 - mean(|x[i] - x[i + offset]|)`; a periodic waveform
/// is close to itself one period later, so strong lags score near 1.
/// A lag is accepted only while the score is still rising toward a
/// local peak and already above [`CORRELATION_THRESHOLD`]; among the
/// accepted lags the best-scoring one wins.
///
/// Out-of-range results (below A0 or above C8) are NOT filtered here;
/// that discard belongs to the caller boundary.
///
/// # Arguments
/// * `samples` - Input audio buffer, normalized to [-1, 1]
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `Some(frequency)` - Detected fundamental in Hz
/// * `None` - Silence, noise, or no strongly periodic lag
pub fn detect_pitch(samples: &[f32], sample_rate: u32) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }

    // --- Loudness gate: silence and the noise floor are a defined
    // "no detection" outcome, not an error. ---
    if rms(samples) < RMS_FLOOR {
        return None;
    }

    let n = samples.len() / 2;

    let mut best_offset: usize = 0;
    let mut best_correlation = 0.0f32;
    let mut previous_correlation = 1.0f32;
    let mut found_candidate = false;

    for offset in 1..n {
        let mut diff_sum = 0.0f32;
        for i in 0..n {
            diff_sum += (samples[i] - samples[i + offset]).abs();
        }
        let correlation = 1.0 - diff_sum / n as f32;

        // Rising-edge rule: accept only while the score is still
        // climbing toward a peak, not once it is past it.
        if correlation > CORRELATION_THRESHOLD && correlation > previous_correlation {
            found_candidate = true;
            if correlation > best_correlation {
                best_correlation = correlation;
                best_offset = offset;
            }
        }
        previous_correlation = correlation;
    }

    if found_candidate && best_offset > 0 {
        Some(sample_rate as f32 / best_offset as f32)
    } else {
        None
    }
}

/// Root-mean-square energy of a buffer.
fn rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|&s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}
