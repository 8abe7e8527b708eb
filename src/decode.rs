//! PCM sample extraction: fixed-width signed integers out of a raw byte
//! buffer, one channel out of an interleaved stream.
//!
//! Samples are little-endian two's complement (the PCM wire convention;
//! 24-bit values are sign-extended by hand). Everything here is direct
//! index math over the input slice — no allocation, no carried state.

/// Bytes per sample for the supported bit depths, `None` otherwise.
pub fn sample_width(bits_per_sample: u16) -> Option<usize> {
    match bits_per_sample {
        16 => Some(2),
        24 => Some(3),
        32 => Some(4),
        _ => None,
    }
}

/// Iterate the selected channel's samples of every complete multi-channel
/// frame in `data`.
///
/// `data` is read as `⌊len / width⌋` consecutive samples grouped into
/// frames of `channels`; the iterator yields the `channel`-th sample of
/// each complete frame, `⌊(len / width) / channels⌋` values in total. A
/// trailing partial frame is dropped within this call, never buffered for
/// the next one.
pub fn channel_samples(
    data: &[u8],
    width: usize,
    channels: usize,
    channel: usize,
) -> impl Iterator<Item = i32> + '_ {
    debug_assert!(channels > 0);
    debug_assert!(channel < channels);
    let frames = (data.len() / width) / channels;
    (0..frames).map(move |frame| {
        let start = (frame * channels + channel) * width;
        decode_sample(&data[start..start + width])
    })
}

fn decode_sample(bytes: &[u8]) -> i32 {
    match *bytes {
        [b0, b1] => i32::from(i16::from_le_bytes([b0, b1])),
        [b0, b1, b2] => (i32::from(b2 as i8) << 16) | (i32::from(b1) << 8) | i32::from(b0),
        [b0, b1, b2, b3] => i32::from_le_bytes([b0, b1, b2, b3]),
        _ => 0,
    }
}
