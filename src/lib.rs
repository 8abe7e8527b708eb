/*MIT License

Copyright (c) 2025 David Maseda Neira

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Streaming PCM-to-spectrum analysis.
//!
//! Raw interleaved PCM bytes go in through [`StreamingFft::write`]; one
//! channel is decoded into a fixed-length analysis window, a pluggable
//! [`FftDriver`](fft_driver::FftDriver) runs the transform each time the
//! window fills, and the dominant frequency or the top-N ranked peaks come
//! back out as [`FftResult`] values.
//!
//! The engine performs no heap allocation after [`StreamingFft::begin`]:
//! decoding is a lazy walk over the input buffer and peak ranking is a
//! bounded insertion into a caller-supplied array. This keeps the hot path
//! usable from real-time audio push paths on resource-constrained hosts.

use std::time::Instant;

use num_traits::Float;
use thiserror::Error;

pub mod decode;
pub mod fft_driver;
pub mod notes;

use fft_driver::FftDriver;
use notes::{Note, NoteTable};

pub mod prelude {
    pub use crate::fft_driver::FftDriver;
    #[cfg(feature = "microfft-driver")]
    pub use crate::fft_driver::MicroFftDriver;
    #[cfg(feature = "rustfft-driver")]
    pub use crate::fft_driver::RustFftDriver;
    pub use crate::notes::{Note, NoteTable};
    pub use crate::{AudioInfo, AudioSink, ConfigError, FftConfig, FftResult, StreamingFft};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The analysis window length is not a power of two (zero included:
    /// `usize::is_power_of_two` rejects it).
    #[error("FFT length must be a power of two, got {0}")]
    InvalidFftLength(usize),

    /// The driver reported itself invalid after `begin`, typically because
    /// it could not allocate or does not support the requested length.
    #[error("FFT driver failed to initialize for length {0}")]
    DriverInit(usize),
}

/// Stream format of the incoming PCM bytes.
///
/// `bits_per_sample` is validated per `write` call, not here: values other
/// than 16/24/32 make `write` accept zero bytes until reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
}

impl Default for AudioInfo {
    fn default() -> Self {
        Self {
            channels: 2,
            bits_per_sample: 16,
            sample_rate: 44100,
        }
    }
}

/// Configuration for one analysis session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FftConfig {
    pub info: AudioInfo,
    /// Which interleaved channel feeds the analysis window (0-based).
    pub channel_used: u16,
}

/// One frequency-domain peak: bin index, magnitude and the frequency the
/// bin maps to under the session's sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FftResult<T: Float> {
    pub bin: usize,
    pub magnitude: T,
    pub frequency: T,
}

impl<T: Float> FftResult<T> {
    /// Placeholder ranked-array entry, below any real magnitude.
    fn sentinel() -> Self {
        Self {
            bin: 0,
            magnitude: T::from(-1.0e6).unwrap(),
            frequency: T::zero(),
        }
    }

    /// Whether this entry holds a real peak. Unfilled slots of
    /// [`StreamingFft::result_array`] report `false`.
    pub fn is_valid(&self) -> bool {
        self.magnitude >= T::zero()
    }

    /// Frequency rounded to the nearest integer Hz.
    pub fn frequency_as_int(&self) -> i32 {
        self.frequency.round().to_i32().unwrap_or(0)
    }

    /// Nearest musical note for this peak, looked up in `table`.
    pub fn note(&self, table: &NoteTable) -> Option<Note> {
        table.note(self.frequency.to_f32()?)
    }
}

/// Byte-oriented push interface for upstream pipeline stages.
pub trait AudioSink {
    /// Accept `data`, returning how many bytes were consumed.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Advisory chunk size the sink would like to receive next.
    fn available_for_write(&self) -> usize;
}

type ResultCallback<T, D> = Box<dyn FnMut(&StreamingFft<T, D>)>;

/// Streaming FFT engine: accumulates decoded samples into a fixed window
/// and runs the driver's transform exactly once per full window.
///
/// The window length is fixed at construction; [`begin`](Self::begin)
/// validates it and prepares the driver. `write` may be called with
/// buffers of any size relative to the window.
pub struct StreamingFft<T: Float, D: FftDriver<T>> {
    driver: D,
    len: usize,
    cfg: FftConfig,
    current_pos: usize,
    result_time: Option<Instant>,
    callback: Option<ResultCallback<T, D>>,
}

impl<T: Float, D: FftDriver<T>> StreamingFft<T, D> {
    /// `fft_len` must be a power of two (e.g. 512, 1024, 2048, 4096);
    /// `begin` rejects anything else.
    pub fn new(fft_len: usize, driver: D) -> Self {
        Self {
            driver,
            len: fft_len,
            cfg: FftConfig::default(),
            current_pos: 0,
            result_time: None,
            callback: None,
        }
    }

    /// Start (or restart) an analysis session. Any partially filled window
    /// is discarded. Non-fatal on error: the caller may fix the
    /// configuration and call `begin` again.
    pub fn begin(&mut self, cfg: FftConfig) -> Result<(), ConfigError> {
        self.cfg = cfg;
        if !self.len.is_power_of_two() {
            log::error!("FFT length must be a power of two: {}", self.len);
            return Err(ConfigError::InvalidFftLength(self.len));
        }
        self.driver.begin(self.len);
        self.current_pos = 0;
        if self.driver.is_valid() {
            Ok(())
        } else {
            log::error!("FFT driver invalid after begin, length {}", self.len);
            Err(ConfigError::DriverInit(self.len))
        }
    }

    /// Update bit depth / sample rate / channel count at runtime.
    /// Equivalent to a full session reset via `begin`.
    pub fn set_audio_info(&mut self, info: AudioInfo) -> Result<(), ConfigError> {
        let mut cfg = self.cfg;
        cfg.info = info;
        self.begin(cfg)
    }

    /// Register a completion callback, invoked synchronously on the `write`
    /// call stack once per completed window. The callback receives the
    /// engine so it can pull `result`/`result_array`/`driver`.
    pub fn set_callback(&mut self, callback: impl FnMut(&StreamingFft<T, D>) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Release the driver's storage. Also runs on drop.
    pub fn end(&mut self) {
        self.driver.end();
    }

    /// Feed raw PCM bytes. Decodes the configured channel, fills the
    /// window and triggers the transform (plus callback) each time the
    /// window completes, all within this call.
    ///
    /// Returns the number of bytes accepted: `data.len()` normally, `0`
    /// when the driver is invalid, `bits_per_sample` is unsupported or
    /// `channel_used` is out of range (the latter two logged, nothing
    /// consumed). A trailing partial multi-channel frame
    /// at the end of `data` is dropped, not carried over to the next call;
    /// producers that cannot write whole frames lose those bytes.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if !self.driver.is_valid() {
            return 0;
        }
        let width = match decode::sample_width(self.cfg.info.bits_per_sample) {
            Some(width) => width,
            None => {
                log::error!(
                    "unsupported bits_per_sample: {}",
                    self.cfg.info.bits_per_sample
                );
                return 0;
            }
        };

        let channels = usize::from(self.cfg.info.channels.max(1));
        let channel = usize::from(self.cfg.channel_used);
        if channel >= channels {
            log::error!(
                "channel_used {} out of range for {} channels",
                channel,
                channels
            );
            return 0;
        }
        for value in decode::channel_samples(data, width, channels, channel) {
            self.driver.set_value(self.current_pos, value);
            self.current_pos += 1;
            if self.current_pos >= self.len {
                self.run_transform();
            }
        }
        data.len()
    }

    /// One full window's worth of input bytes at the current bit depth.
    /// Advisory only; `write` accepts any size.
    pub fn available_for_write(&self) -> usize {
        usize::from(self.cfg.info.bits_per_sample) / 8 * self.len
    }

    /// The analysis window length (number of time-domain slots).
    pub fn size(&self) -> usize {
        self.len
    }

    /// When the last transform completed. `None` until the first window
    /// fills; poll this to detect fresh results.
    pub fn result_time(&self) -> Option<Instant> {
        self.result_time
    }

    /// Center frequency of `bin` under the configured sample rate.
    pub fn frequency(&self, bin: usize) -> T {
        T::from(bin).unwrap() * T::from(self.cfg.info.sample_rate).unwrap()
            / T::from(self.len).unwrap()
    }

    /// Dominant peak of the most recent transform. Bin 0 (DC) is always
    /// excluded; ties resolve to the lowest bin because the scan replaces
    /// only on strictly greater magnitude.
    pub fn result(&self) -> FftResult<T> {
        let mut ret = FftResult {
            bin: 0,
            magnitude: T::zero(),
            frequency: T::zero(),
        };
        for bin in 1..self.len / 2 {
            let m = self.driver.magnitude(bin);
            if m > ret.magnitude {
                ret.magnitude = m;
                ret.bin = bin;
            }
        }
        ret.frequency = self.frequency(ret.bin);
        ret
    }

    /// Fill `result` with the N largest peaks across bins `1..len/2`,
    /// sorted by descending magnitude, ties broken by lower bin. Slots
    /// beyond the number of candidate bins keep a sentinel entry for which
    /// [`FftResult::is_valid`] is `false`.
    pub fn result_array<const N: usize>(&self, result: &mut [FftResult<T>; N]) {
        for slot in result.iter_mut() {
            *slot = FftResult::sentinel();
        }
        for bin in 1..self.len / 2 {
            let act = FftResult {
                bin,
                magnitude: self.driver.magnitude(bin),
                frequency: self.frequency(bin),
            };
            insert_sorted(result, act);
        }
    }

    /// The active driver, for callers that want raw magnitudes.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn run_transform(&mut self) {
        self.driver.fft();
        self.current_pos = 0;
        self.result_time = Some(Instant::now());
        // Take the callback out so it can borrow the engine while running.
        if let Some(mut callback) = self.callback.take() {
            callback(self);
            self.callback = Some(callback);
        }
    }
}

impl<T: Float, D: FftDriver<T>> AudioSink for StreamingFft<T, D> {
    fn write(&mut self, data: &[u8]) -> usize {
        StreamingFft::write(self, data)
    }

    fn available_for_write(&self) -> usize {
        StreamingFft::available_for_write(self)
    }
}

impl<T: Float, D: FftDriver<T>> Drop for StreamingFft<T, D> {
    fn drop(&mut self) {
        self.driver.end();
    }
}

/// Bounded insertion into a descending-magnitude array: find the leftmost
/// slot strictly smaller than `act`, shift the tail right (dropping the
/// last entry) and place `act` there. One insertion per candidate, so an
/// equal-magnitude later bin never displaces an earlier one.
fn insert_sorted<T: Float, const N: usize>(result: &mut [FftResult<T>; N], act: FftResult<T>) {
    for j in 0..N {
        if act.magnitude > result[j].magnitude {
            for i in (j..N - 1).rev() {
                result[i + 1] = result[i];
            }
            result[j] = act;
            return;
        }
    }
}
