//! End-to-end checks against the rustfft reference driver: pure sinusoids
//! in, dominant bin out.
#![cfg(feature = "rustfft-driver")]

mod common;

use audiofft_rs::prelude::*;
use common::sine_i16;

const FFT_LEN: usize = 1024;
const SAMPLE_RATE: u32 = 44100;

fn mono_rustfft_engine() -> StreamingFft<f32, RustFftDriver<f32>> {
    let mut engine = StreamingFft::new(FFT_LEN, RustFftDriver::new());
    let cfg = FftConfig {
        info: AudioInfo {
            channels: 1,
            bits_per_sample: 16,
            sample_rate: SAMPLE_RATE,
        },
        channel_used: 0,
    };
    engine.begin(cfg).unwrap();
    engine
}

#[test]
fn test_sine_lands_in_expected_bin() {
    let mut engine = mono_rustfft_engine();

    // A frequency sitting exactly on bin 64.
    let target_bin = 64usize;
    let frequency = engine.frequency(target_bin);
    let data = sine_i16(frequency, SAMPLE_RATE, FFT_LEN, 10000);

    assert_eq!(engine.write(&data), data.len());
    let result = engine.result();
    assert!(
        (result.bin as i64 - target_bin as i64).abs() <= 1,
        "bin {} not within 1 of {}",
        result.bin,
        target_bin
    );
    assert!(result.magnitude > 0.0);
}

#[test]
fn test_frequency_round_trip() {
    let mut engine = mono_rustfft_engine();

    // An off-grid tone: round(observed * len / rate) must recover a bin
    // within one of the reported peak.
    let frequency = 2761.0f32;
    let data = sine_i16(frequency, SAMPLE_RATE, FFT_LEN, 10000);
    engine.write(&data);

    let result = engine.result();
    let recovered = (result.frequency * FFT_LEN as f32 / SAMPLE_RATE as f32).round() as i64;
    assert!((recovered - result.bin as i64).abs() <= 1);

    let expected_bin = (frequency * FFT_LEN as f32 / SAMPLE_RATE as f32).round() as i64;
    assert!((result.bin as i64 - expected_bin).abs() <= 1);
}

#[test]
fn test_stereo_analyzes_selected_channel_only() {
    let mut engine = StreamingFft::new(FFT_LEN, RustFftDriver::<f32>::new());
    let cfg = FftConfig {
        info: AudioInfo {
            channels: 2,
            bits_per_sample: 16,
            sample_rate: SAMPLE_RATE,
        },
        channel_used: 1,
    };
    engine.begin(cfg).unwrap();

    // Left carries bin 32, right carries bin 100; the engine listens right.
    let left = sine_i16(engine.frequency(32), SAMPLE_RATE, FFT_LEN, 10000);
    let right = sine_i16(engine.frequency(100), SAMPLE_RATE, FFT_LEN, 10000);
    let mut interleaved = Vec::with_capacity(left.len() + right.len());
    for i in 0..FFT_LEN {
        interleaved.extend_from_slice(&left[2 * i..2 * i + 2]);
        interleaved.extend_from_slice(&right[2 * i..2 * i + 2]);
    }

    engine.write(&interleaved);
    let result = engine.result();
    assert!((result.bin as i64 - 100).abs() <= 1);
}

#[test]
fn test_top_peaks_contain_both_tones() {
    let mut engine = mono_rustfft_engine();

    // Two tones, the louder on bin 50, the quieter on bin 200.
    let loud = sine_i16(engine.frequency(50), SAMPLE_RATE, FFT_LEN, 12000);
    let quiet = sine_i16(engine.frequency(200), SAMPLE_RATE, FFT_LEN, 4000);
    let mixed: Vec<u8> = (0..FFT_LEN)
        .flat_map(|i| {
            let a = i16::from_le_bytes([loud[2 * i], loud[2 * i + 1]]);
            let b = i16::from_le_bytes([quiet[2 * i], quiet[2 * i + 1]]);
            (a.saturating_add(b)).to_le_bytes()
        })
        .collect();

    engine.write(&mixed);

    let mut peaks = [FftResult {
        bin: 0,
        magnitude: 0.0,
        frequency: 0.0,
    }; 8];
    engine.result_array(&mut peaks);

    assert!((peaks[0].bin as i64 - 50).abs() <= 1);
    assert!(peaks
        .iter()
        .filter(|p| p.is_valid())
        .any(|p| (p.bin as i64 - 200).abs() <= 1));
    for pair in peaks.windows(2) {
        assert!(pair[0].magnitude >= pair[1].magnitude);
    }
}

#[test]
fn test_note_lookup_on_result() {
    let mut engine = mono_rustfft_engine();

    // 440 Hz is between bins 10 and 11 at this resolution; accept either
    // neighbor but the note must still resolve to A4.
    let data = sine_i16(440.0, SAMPLE_RATE, FFT_LEN, 10000);
    engine.write(&data);

    let result = engine.result();
    let note = result.note(&NoteTable::new()).unwrap();
    assert_eq!(note.name, "A");
    assert_eq!(note.octave, 4);
}
