//! Note messages and pitch conversions.

use crate::modulation::ModulationParameters;

/// Number of pitch lanes (MIDI note range).
pub const PITCH_COUNT: usize = 128;

/// Highest valid pitch.
pub const MAX_PITCH: u8 = 127;

/// Sink for note events.
///
/// `velocity == 0` is reserved as the note-off signal for `pitch`; it is
/// never a note-on with zero amplitude. `voice_index` optionally targets
/// a specific voice slot (monophonic per-voice routing from an upstream
/// polyphonic source); `None` lets the receiver allocate.
///
/// Event timing is entirely the caller's responsibility; receivers make
/// no timing decisions beyond the `time` tag (milliseconds) attached to
/// each event.
pub trait NoteReceiver {
    fn play_note(
        &mut self,
        time: f64,
        pitch: u8,
        velocity: u8,
        voice_index: Option<usize>,
        modulation: &ModulationParameters,
    );
}

/// Convert a (possibly fractional) MIDI pitch to frequency in Hz.
/// A4 (pitch 69) = 440 Hz, twelve-tone equal temperament.
pub fn pitch_to_frequency(pitch: f32) -> f32 {
    440.0 * libm::powf(2.0, (pitch - 69.0) / 12.0)
}
