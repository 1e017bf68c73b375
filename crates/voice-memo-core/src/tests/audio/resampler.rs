use crate::audio::Resampler;

// Test constants
const RECORDING_RATE: u32 = 16000;
const DEVICE_RATE: u32 = 48000;
const CD_RATE: u32 = 44100;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;
const SETTLED_TOLERANCE: f32 = 0.05;
const TONE_FREQUENCY_FACTOR: f32 = 0.05;
const MAX_AMPLITUDE: f32 = 1.5;

/// WHAT: Upsampling 16kHz to 48kHz triples the length exactly
/// WHY: Playback duration must match the recorded duration
#[test]
#[allow(clippy::unwrap_used)]
fn given_16khz_recording_when_resampling_to_48khz_then_length_tripled() {
    // Given: One second at 16kHz
    let mut resampler = Resampler::new(RECORDING_RATE, DEVICE_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; RECORDING_RATE as usize];

    // When: Resampling
    let output = resampler.resample(&input).unwrap();

    // Then: One second at 48kHz, DC level preserved away from the edges
    assert_eq!(output.len(), DEVICE_RATE as usize);
    let middle = output[output.len() / 2];
    assert!(
        (middle - TEST_SIGNAL_AMPLITUDE).abs() < SETTLED_TOLERANCE,
        "Expected ~{}, got {}",
        TEST_SIGNAL_AMPLITUDE,
        middle
    );
}

/// WHAT: A recording shorter than one resampler chunk is still converted
/// WHY: Very short memos must play, not vanish in the filter delay
#[test]
#[allow(clippy::unwrap_used)]
fn given_short_recording_when_resampling_then_tail_flushed() {
    // Given: 100 samples at 44.1kHz
    let mut resampler = Resampler::new(CD_RATE, DEVICE_RATE).unwrap();
    let input: Vec<f32> = (0..100)
        .map(|i| (i as f32 * TONE_FREQUENCY_FACTOR).sin())
        .collect();

    // When: Resampling
    let output = resampler.resample(&input).unwrap();

    // Then: Proportional length, finite and bounded
    assert_eq!(output.len(), 100 * DEVICE_RATE as usize / CD_RATE as usize);
    assert!(
        output
            .iter()
            .all(|&s| s.is_finite() && s.abs() <= MAX_AMPLITUDE)
    );
}

/// WHAT: Empty samples return empty output
/// WHY: An empty recording plays as silence and completes at once
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_recording_when_resampling_then_empty_output() {
    // Given: Resampler and empty input
    let mut resampler = Resampler::new(RECORDING_RATE, DEVICE_RATE).unwrap();

    // When: Resampling empty data
    let output = resampler.resample(&[]).unwrap();

    // Then: Output is also empty
    assert!(output.is_empty());
}
