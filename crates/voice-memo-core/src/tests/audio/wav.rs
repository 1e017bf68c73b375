use crate::audio::{
    WavFileWriter,
    wav::{downmix, read_mono},
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tempfile::tempdir;

const SAMPLE_RATE: u32 = 8000;

/// WHAT: Writer produces a mono 16-bit file from stereo input
/// WHY: The recording slot must be a plain PCM WAV any player can open
#[test]
#[allow(clippy::unwrap_used)]
fn given_stereo_buffers_when_finalizing_then_mono_pcm16_file_written() {
    // Given: A writer for a two-channel device
    let dir = tempdir().unwrap();
    let path = dir.path().join("memo.wav");
    let writer = WavFileWriter::create(&path, SAMPLE_RATE, 2).unwrap();
    let samples = writer.sender();

    // When: Writing two buffers of two frames each, then finalizing
    assert!(samples.write(&[0.5, 0.5, -0.5, -0.5]));
    assert!(samples.write(&[1.0, 0.0, 0.0, 0.0]));
    writer.finalize().unwrap();

    // Then: Four mono 16-bit samples, frames averaged
    let reader = WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    let written: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(written, vec![16383, -16383, 16383, 0]);
}

/// WHAT: A new recording overwrites the previous one
/// WHY: There is a single recording slot
#[test]
#[allow(clippy::unwrap_used)]
fn given_existing_recording_when_recording_again_then_file_replaced() {
    // Given: A file with ten samples
    let dir = tempdir().unwrap();
    let path = dir.path().join("memo.wav");
    let first = WavFileWriter::create(&path, SAMPLE_RATE, 1).unwrap();
    first.sender().write(&[0.1; 10]);
    first.finalize().unwrap();

    // When: Recording two samples into the same path
    let second = WavFileWriter::create(&path, SAMPLE_RATE, 1).unwrap();
    second.sender().write(&[0.1; 2]);
    second.finalize().unwrap();

    // Then: Only the new samples remain
    assert_eq!(WavReader::open(&path).unwrap().len(), 2);
}

/// WHAT: Creating a writer in a missing directory fails to open
/// WHY: Unwritable storage is a capture open failure
#[test]
fn given_missing_directory_when_creating_writer_then_open_failed() {
    let path = std::env::temp_dir()
        .join("voice-memo-missing-dir")
        .join("nested")
        .join("memo.wav");
    let result = WavFileWriter::create(&path, SAMPLE_RATE, 1);
    assert!(matches!(
        result,
        Err(crate::MemoError::CapabilityOpenFailed { .. })
    ));
}

/// WHAT: Reader decodes stereo float files to mono
/// WHY: Playback must accept files not written by this recorder
#[test]
#[allow(clippy::unwrap_used)]
fn given_stereo_float_file_when_reading_then_mono_samples() {
    // Given: A stereo 32-bit float file
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for sample in [0.2f32, 0.4, -1.0, 1.0] {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();

    // When: Reading
    let recording = read_mono(&path).unwrap();

    // Then: Two averaged frames at the file's rate
    assert_eq!(recording.sample_rate, 44100);
    assert_eq!(recording.samples.len(), 2);
    assert!((recording.samples[0] - 0.3).abs() < 1e-6);
    assert!(recording.samples[1].abs() < 1e-6);
}

/// WHAT: Downmix averages each frame
/// WHY: Multi-channel input must be folded, not truncated
#[test]
fn given_three_channel_frames_when_downmixing_then_averaged() {
    let mono = downmix(&[0.3, 0.3, 0.3, 0.0, 0.6, 0.0], 3);
    assert_eq!(mono.len(), 2);
    assert!((mono[0] - 0.3).abs() < 1e-6);
    assert!((mono[1] - 0.2).abs() < 1e-6);
}
