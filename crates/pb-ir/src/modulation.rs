//! Per-voice modulation parameters.
//!
//! A `ModulationParameters` bundle travels with every note event and is
//! handed to the voice that ends up sounding the note. Pitch bend, mod
//! wheel, and pressure are each an optional continuous signal source;
//! an absent source reads as the neutral value 0.0. Pan is a plain value
//! because it is latched per note rather than streamed.

use alloc::sync::Arc;

/// A continuous control signal sampled at block rate.
///
/// `samples_in` is the offset into the current block, letting a source
/// interpolate within the block if it wants to.
pub trait ModSource: Send + Sync {
    fn value(&self, samples_in: usize) -> f32;
}

/// Shared handle to a modulation source.
///
/// Sources are owned by whoever produced the note (a canvas note, a MIDI
/// input lane) and shared with the voice for the note's lifetime.
pub type ModSignal = Arc<dyn ModSource>;

/// A fixed-value modulation source.
pub struct Constant(pub f32);

impl ModSource for Constant {
    fn value(&self, _samples_in: usize) -> f32 {
        self.0
    }
}

/// The expressive signals associated with one voice/note.
#[derive(Clone, Default)]
pub struct ModulationParameters {
    pub pitch_bend: Option<ModSignal>,
    pub mod_wheel: Option<ModSignal>,
    pub pressure: Option<ModSignal>,
    /// Stereo position, -1.0 (left) to 1.0 (right).
    pub pan: f32,
}

impl ModulationParameters {
    /// A bundle with no sources and the given pan.
    pub fn with_pan(pan: f32) -> Self {
        Self { pan, ..Self::default() }
    }

    /// Current pitch bend in semitones (0.0 when absent).
    pub fn bend(&self, samples_in: usize) -> f32 {
        read(&self.pitch_bend, samples_in)
    }

    /// Current mod wheel position (0.0 when absent).
    pub fn wheel(&self, samples_in: usize) -> f32 {
        read(&self.mod_wheel, samples_in)
    }

    /// Current channel pressure (0.0 when absent).
    pub fn pressure(&self, samples_in: usize) -> f32 {
        read(&self.pressure, samples_in)
    }
}

fn read(signal: &Option<ModSignal>, samples_in: usize) -> f32 {
    match signal {
        Some(source) => source.value(samples_in),
        None => 0.0,
    }
}
