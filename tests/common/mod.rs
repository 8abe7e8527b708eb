//! Common test utilities: a scriptable stub driver and PCM generators.
#![allow(dead_code)]

use audiofft_rs::prelude::*;

/// Driver double for engine tests: records stored samples, counts
/// transform invocations and serves a scripted magnitude spectrum.
pub struct StubDriver {
    pub valid: bool,
    pub fail_begin: bool,
    pub fft_count: usize,
    pub values: Vec<i32>,
    pub magnitudes: Vec<f32>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self {
            valid: false,
            fail_begin: false,
            fft_count: 0,
            values: Vec::new(),
            magnitudes: Vec::new(),
        }
    }

    pub fn with_magnitudes(magnitudes: Vec<f32>) -> Self {
        Self {
            magnitudes,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_begin: true,
            ..Self::new()
        }
    }
}

impl FftDriver<f32> for StubDriver {
    fn begin(&mut self, len: usize) {
        if self.fail_begin {
            self.valid = false;
            return;
        }
        self.values = vec![0; len];
        self.valid = true;
    }

    fn end(&mut self) {
        self.valid = false;
        self.values = Vec::new();
    }

    fn set_value(&mut self, pos: usize, value: i32) {
        self.values[pos] = value;
    }

    fn fft(&mut self) {
        self.fft_count += 1;
    }

    fn magnitude(&self, idx: usize) -> f32 {
        self.magnitudes.get(idx).copied().unwrap_or(0.0)
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Mono 16-bit sine at `frequency` Hz, little-endian bytes.
pub fn sine_i16(frequency: f32, sample_rate: u32, samples: usize, amplitude: i16) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples * 2);
    for i in 0..samples {
        let t = i as f32 / sample_rate as f32;
        let value = (2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude as f32;
        data.extend_from_slice(&(value as i16).to_le_bytes());
    }
    data
}

/// Engine over a stub driver with a mono 16-bit session already begun.
pub fn mono_engine(
    fft_len: usize,
    sample_rate: u32,
    driver: StubDriver,
) -> StreamingFft<f32, StubDriver> {
    let mut engine = StreamingFft::new(fft_len, driver);
    let cfg = FftConfig {
        info: AudioInfo {
            channels: 1,
            bits_per_sample: 16,
            sample_rate,
        },
        channel_used: 0,
    };
    engine.begin(cfg).expect("begin should succeed");
    engine
}

/// 16-bit LE bytes for a slice of sample values.
pub fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
