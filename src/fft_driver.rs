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

//! Transform driver abstraction.
//!
//! The engine is algorithm-agnostic: anything implementing [`FftDriver`]
//! can back it. Two drivers ship with the crate:
//! - `rustfft` (feature `rustfft-driver`, default): full-featured, any
//!   power-of-two length.
//! - `microfft` (feature `microfft-driver`): lightweight, `f32` only,
//!   lengths 2..=4096, suited to embedded targets.

use num_traits::Float;

/// Contract between the streaming engine and a spectral-transform backend.
///
/// Lifecycle: `begin(len)` prepares storage for `len` time-domain slots
/// (failure is observable through `is_valid`, not a panic); `set_value`
/// stores decoded samples; `fft` runs the transform over the stored
/// window; `magnitude(idx)` reads bin `idx < len / 2` of the most recent
/// transform; `end` releases storage and is safe to call at any point.
///
/// `set_value` and `magnitude` take in-range indices by contract — the
/// engine guarantees this; drivers are not required to bounds-check.
pub trait FftDriver<T: Float> {
    fn begin(&mut self, len: usize);
    fn end(&mut self);
    fn set_value(&mut self, pos: usize, value: i32);
    fn fft(&mut self);
    fn magnitude(&self, idx: usize) -> T;
    fn is_valid(&self) -> bool;
}

#[cfg(feature = "rustfft-driver")]
mod rustfft_impl {
    use std::sync::Arc;

    use num_traits::Float;
    use rustfft::num_complex::Complex;
    use rustfft::{Fft, FftNum, FftPlanner};

    use super::FftDriver;

    /// Reference driver backed by `rustfft`.
    ///
    /// Keeps the real input window separate from the complex spectrum so
    /// magnitudes from the last transform stay readable while the next
    /// window is already filling. Both buffers are sized once in `begin`.
    pub struct RustFftDriver<T: FftNum> {
        fft: Option<Arc<dyn Fft<T>>>,
        input: Vec<T>,
        spectrum: Vec<Complex<T>>,
    }

    impl<T: FftNum> RustFftDriver<T> {
        pub fn new() -> Self {
            Self {
                fft: None,
                input: Vec::new(),
                spectrum: Vec::new(),
            }
        }
    }

    impl<T: FftNum> Default for RustFftDriver<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T: Float + FftNum> FftDriver<T> for RustFftDriver<T> {
        fn begin(&mut self, len: usize) {
            if len == 0 {
                self.end();
                return;
            }
            let mut planner = FftPlanner::new();
            self.fft = Some(planner.plan_fft_forward(len));
            self.input.clear();
            self.input.resize(len, T::zero());
            self.spectrum.clear();
            self.spectrum
                .resize(len, Complex::new(T::zero(), T::zero()));
        }

        fn end(&mut self) {
            self.fft = None;
            self.input = Vec::new();
            self.spectrum = Vec::new();
        }

        fn set_value(&mut self, pos: usize, value: i32) {
            self.input[pos] = T::from_i32(value).unwrap_or_else(T::zero);
        }

        fn fft(&mut self) {
            if let Some(fft) = &self.fft {
                for (out, &sample) in self.spectrum.iter_mut().zip(self.input.iter()) {
                    *out = Complex::new(sample, T::zero());
                }
                fft.process(&mut self.spectrum);
            }
        }

        fn magnitude(&self, idx: usize) -> T {
            self.spectrum[idx].norm()
        }

        fn is_valid(&self) -> bool {
            self.fft.is_some()
        }
    }
}

#[cfg(feature = "rustfft-driver")]
pub use rustfft_impl::RustFftDriver;

#[cfg(feature = "microfft-driver")]
mod microfft_impl {
    use microfft::Complex32;

    use super::FftDriver;

    /// Run the size-specialized complex FFT over the first `$size` slots.
    macro_rules! cfft_sized {
        ($buf:expr, $size:literal, $f:ident) => {{
            let frame: &mut [Complex32; $size] =
                (&mut $buf[..$size]).try_into().expect("length checked in begin");
            // Transform is in place; the returned reference is not needed.
            let _ = microfft::complex::$f(frame);
        }};
    }

    /// Driver backed by `microfft`, for hosts where `rustfft` is too heavy.
    ///
    /// Supports `f32` windows of 2..=4096 samples (the sizes `microfft`
    /// provides). `begin` with any other length leaves the driver invalid
    /// instead of panicking, which the engine reports as a failed `begin`.
    pub struct MicroFftDriver {
        input: Vec<f32>,
        spectrum: Vec<Complex32>,
        len: usize,
    }

    impl MicroFftDriver {
        pub fn new() -> Self {
            Self {
                input: Vec::new(),
                spectrum: Vec::new(),
                len: 0,
            }
        }

        fn supported(len: usize) -> bool {
            len.is_power_of_two() && (2..=4096).contains(&len)
        }
    }

    impl Default for MicroFftDriver {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FftDriver<f32> for MicroFftDriver {
        fn begin(&mut self, len: usize) {
            if !Self::supported(len) {
                self.end();
                return;
            }
            self.len = len;
            self.input.clear();
            self.input.resize(len, 0.0);
            self.spectrum.clear();
            self.spectrum.resize(len, Complex32::new(0.0, 0.0));
        }

        fn end(&mut self) {
            self.len = 0;
            self.input = Vec::new();
            self.spectrum = Vec::new();
        }

        fn set_value(&mut self, pos: usize, value: i32) {
            self.input[pos] = value as f32;
        }

        fn fft(&mut self) {
            for (out, &sample) in self.spectrum.iter_mut().zip(self.input.iter()) {
                *out = Complex32::new(sample, 0.0);
            }
            match self.len {
                2 => cfft_sized!(self.spectrum, 2, cfft_2),
                4 => cfft_sized!(self.spectrum, 4, cfft_4),
                8 => cfft_sized!(self.spectrum, 8, cfft_8),
                16 => cfft_sized!(self.spectrum, 16, cfft_16),
                32 => cfft_sized!(self.spectrum, 32, cfft_32),
                64 => cfft_sized!(self.spectrum, 64, cfft_64),
                128 => cfft_sized!(self.spectrum, 128, cfft_128),
                256 => cfft_sized!(self.spectrum, 256, cfft_256),
                512 => cfft_sized!(self.spectrum, 512, cfft_512),
                1024 => cfft_sized!(self.spectrum, 1024, cfft_1024),
                2048 => cfft_sized!(self.spectrum, 2048, cfft_2048),
                4096 => cfft_sized!(self.spectrum, 4096, cfft_4096),
                _ => {}
            }
        }

        fn magnitude(&self, idx: usize) -> f32 {
            let c = self.spectrum[idx];
            (c.re * c.re + c.im * c.im).sqrt()
        }

        fn is_valid(&self) -> bool {
            self.len != 0
        }
    }
}

#[cfg(feature = "microfft-driver")]
pub use microfft_impl::MicroFftDriver;
