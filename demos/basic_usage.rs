//! Feed one window of synthetic PCM and read the dominant frequency.
//!
//! Run with: cargo run --example basic_usage

use audiofft_rs::prelude::*;

fn main() {
    env_logger::init();

    let fft_len = 2048;
    let sample_rate = 44100u32;

    let mut engine = StreamingFft::new(fft_len, RustFftDriver::<f32>::new());
    let cfg = FftConfig {
        info: AudioInfo {
            channels: 1,
            bits_per_sample: 16,
            sample_rate,
        },
        channel_used: 0,
    };
    engine.begin(cfg).expect("valid configuration");

    // One window of a 440 Hz sine, 16-bit mono.
    let mut pcm = Vec::with_capacity(fft_len * 2);
    for i in 0..fft_len {
        let t = i as f32 / sample_rate as f32;
        let sample = ((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 20000.0) as i16;
        pcm.extend_from_slice(&sample.to_le_bytes());
    }
    engine.write(&pcm);

    let result = engine.result();
    println!(
        "dominant: bin {} -> {:.1} Hz (magnitude {:.0})",
        result.bin, result.frequency, result.magnitude
    );

    let notes = NoteTable::new();
    if let Some(note) = result.note(&notes) {
        println!("note: {}{} ({:+.1} Hz off pitch)", note.name, note.octave, note.diff);
    }
}
