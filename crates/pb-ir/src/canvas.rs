//! Note-canvas data model: a looping grid of recorded notes.
//!
//! Positions are normalized to the canvas loop: 0.0 is the start of the
//! first measure, 1.0 wraps back around. The playback side (the canvas
//! player in the engine crate) samples `active_mask` once per audio
//! block and derives edge-triggered note events from it; editing lives
//! elsewhere.

use alloc::vec::Vec;

use crate::modulation::ModulationParameters;
use crate::note::PITCH_COUNT;

/// One recorded note on the canvas.
#[derive(Clone)]
pub struct CanvasNote {
    pub pitch: u8,
    /// Normalized start position, 0..1.
    pub start: f32,
    /// Normalized length. Notes may wrap across the loop boundary.
    pub length: f32,
    /// Velocity, 0..1.
    pub velocity: f32,
    /// Explicit voice slot routing, if any.
    pub voice_index: Option<usize>,
    /// Expressive signals latched when this note fires.
    pub modulation: ModulationParameters,
}

impl CanvasNote {
    pub fn new(pitch: u8, start: f32, length: f32, velocity: f32) -> Self {
        Self {
            pitch,
            start,
            length,
            velocity,
            voice_index: None,
            modulation: ModulationParameters::default(),
        }
    }

    /// Is this note sounding at normalized position `pos`?
    pub fn contains(&self, pos: f32) -> bool {
        if self.length >= 1.0 {
            return true;
        }
        let end = self.start + self.length;
        if end <= 1.0 {
            pos >= self.start && pos < end
        } else {
            // wraps past the loop point
            pos >= self.start || pos < end - 1.0
        }
    }
}

/// Which of the 128 pitch lanes are sounding at some position.
///
/// A plain boolean-per-lane array, compared positionally each block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PitchMask([bool; PITCH_COUNT]);

impl PitchMask {
    pub const fn empty() -> Self {
        Self([false; PITCH_COUNT])
    }

    pub fn get(&self, pitch: usize) -> bool {
        self.0[pitch]
    }

    pub fn set(&mut self, pitch: usize, on: bool) {
        self.0[pitch] = on;
    }
}

impl Default for PitchMask {
    fn default() -> Self {
        Self::empty()
    }
}

/// A looping canvas of notes spanning `measures` measures.
#[derive(Clone, Default)]
pub struct NoteCanvas {
    notes: Vec<CanvasNote>,
    measures: u32,
}

impl NoteCanvas {
    pub fn new(measures: u32) -> Self {
        Self {
            notes: Vec::new(),
            measures: measures.max(1),
        }
    }

    pub fn measures(&self) -> u32 {
        self.measures
    }

    pub fn set_measures(&mut self, measures: u32) {
        self.measures = measures.max(1);
    }

    pub fn add(&mut self, note: CanvasNote) {
        self.notes.push(note);
    }

    pub fn notes(&self) -> &[CanvasNote] {
        &self.notes
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// The set of pitch lanes sounding at normalized position `pos`.
    pub fn active_mask(&self, pos: f32) -> PitchMask {
        let mut mask = PitchMask::empty();
        for note in &self.notes {
            if note.contains(pos) {
                mask.set(note.pitch as usize, true);
            }
        }
        mask
    }

    /// The note sounding on `pitch` at `pos`, if any.
    pub fn note_at(&self, pos: f32, pitch: u8) -> Option<&CanvasNote> {
        self.notes
            .iter()
            .find(|n| n.pitch == pitch && n.contains(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas_empty_mask() {
        let canvas = NoteCanvas::new(1);
        assert_eq!(canvas.active_mask(0.5), PitchMask::empty());
    }

    #[test]
    fn note_active_within_interval() {
        let note = CanvasNote::new(60, 0.25, 0.25, 1.0);
        assert!(!note.contains(0.1));
        assert!(note.contains(0.25));
        assert!(note.contains(0.4));
        assert!(!note.contains(0.5));
    }

    #[test]
    fn note_wraps_across_loop_boundary() {
        let note = CanvasNote::new(60, 0.9, 0.2, 1.0);
        assert!(note.contains(0.95));
        assert!(note.contains(0.05));
        assert!(!note.contains(0.5));
    }

    #[test]
    fn full_length_note_always_active() {
        let note = CanvasNote::new(60, 0.3, 1.0, 1.0);
        assert!(note.contains(0.0));
        assert!(note.contains(0.99));
    }

    #[test]
    fn mask_reflects_sounding_pitches() {
        let mut canvas = NoteCanvas::new(1);
        canvas.add(CanvasNote::new(60, 0.0, 0.5, 1.0));
        canvas.add(CanvasNote::new(64, 0.25, 0.5, 1.0));

        let mask = canvas.active_mask(0.3);
        assert!(mask.get(60));
        assert!(mask.get(64));
        assert!(!mask.get(67));

        let mask = canvas.active_mask(0.6);
        assert!(!mask.get(60));
        assert!(mask.get(64));
    }

    #[test]
    fn note_at_finds_matching_note() {
        let mut canvas = NoteCanvas::new(1);
        let mut note = CanvasNote::new(60, 0.0, 0.5, 0.8);
        note.voice_index = Some(3);
        canvas.add(note);

        let found = canvas.note_at(0.25, 60).unwrap();
        assert_eq!(found.voice_index, Some(3));
        assert!(canvas.note_at(0.75, 60).is_none());
        assert!(canvas.note_at(0.25, 61).is_none());
    }

    #[test]
    fn measures_never_zero() {
        let canvas = NoteCanvas::new(0);
        assert_eq!(canvas.measures(), 1);
    }
}
