//! Stream stereo PCM in irregular chunks and report the top peaks from the
//! completion callback, once per filled window.
//!
//! Run with: cargo run --example streaming_usage

use audiofft_rs::prelude::*;

fn main() {
    env_logger::init();

    let fft_len = 1024;
    let sample_rate = 44100u32;

    let mut engine = StreamingFft::new(fft_len, RustFftDriver::<f32>::new());
    let cfg = FftConfig {
        info: AudioInfo {
            channels: 2,
            bits_per_sample: 16,
            sample_rate,
        },
        channel_used: 0,
    };
    engine.begin(cfg).expect("valid configuration");

    engine.set_callback(|fft| {
        let mut peaks = [FftResult {
            bin: 0,
            magnitude: 0.0,
            frequency: 0.0,
        }; 5];
        fft.result_array(&mut peaks);

        println!("window complete:");
        for peak in peaks.iter().filter(|p| p.is_valid()) {
            println!("  {:7.1} Hz  magnitude {:.0}", peak.frequency, peak.magnitude);
        }
    });

    // Two tones left, silence right; pushed in deliberately awkward chunks.
    let seconds = 0.5;
    let frames = (sample_rate as f32 * seconds) as usize;
    let mut pcm = Vec::with_capacity(frames * 4);
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let left = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 12000.0
            + (2.0 * std::f32::consts::PI * 1000.0 * t).sin() * 6000.0;
        pcm.extend_from_slice(&(left as i16).to_le_bytes());
        pcm.extend_from_slice(&0i16.to_le_bytes());
    }

    let hint = engine.available_for_write();
    println!("sink asks for {} bytes per push", hint);
    for chunk in pcm.chunks(1000) {
        engine.write(chunk);
    }
}
