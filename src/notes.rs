//! Frequency-to-note lookup.
//!
//! An explicit, injectable collaborator: pass a [`NoteTable`] to
//! [`FftResult::note`](crate::FftResult::note) (or use it directly) rather
//! than relying on any process-wide table. Equal temperament relative to a
//! configurable A4 reference.

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A named note with the signed deviation of the observed frequency from
/// the note's exact pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub name: &'static str,
    pub octave: i32,
    /// Observed frequency minus the exact note frequency, in Hz.
    pub diff: f32,
}

/// Equal-temperament note table.
#[derive(Debug, Clone, Copy)]
pub struct NoteTable {
    a4: f32,
}

impl Default for NoteTable {
    fn default() -> Self {
        Self { a4: 440.0 }
    }
}

impl NoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table tuned to a non-standard A4 reference (e.g. 442 Hz).
    pub fn with_reference(a4: f32) -> Self {
        Self { a4 }
    }

    /// Nearest note for `frequency` in Hz. `None` for non-positive or
    /// non-finite input, or frequencies outside the C-1..G9 MIDI range.
    pub fn note(&self, frequency: f32) -> Option<Note> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return None;
        }
        let semitones = (12.0 * (frequency / self.a4).log2()).round() as i32;
        // A4 is MIDI note 69.
        let midi = 69 + semitones;
        if !(0..=127).contains(&midi) {
            return None;
        }
        let exact = self.a4 * 2.0f32.powf(semitones as f32 / 12.0);
        Some(Note {
            name: NOTE_NAMES[(midi % 12) as usize],
            octave: midi / 12 - 1,
            diff: frequency - exact,
        })
    }
}
