//! The voice capability: what the pool asks of a synthesis unit.

use alloc::boxed::Box;
use pb_ir::{ChannelBuffer, ModulationParameters};

use crate::oscillator_voice::{OscillatorParams, OscillatorVoice};
use crate::sample_voice::{SampleVoice, SamplerParams};

/// A stateful synthesis unit owned by one pool slot.
///
/// The pool drives the full lifecycle through this interface; a voice
/// never frees itself and is never destroyed mid-session, only
/// `clear()`ed back to silence and restarted. `process` *accumulates*
/// into the output buffer so multiple voices can share it, and must
/// contribute exact silence when idle or fully released.
pub trait Voice: Send {
    fn set_pitch(&mut self, pitch: u8);
    fn set_modulators(&mut self, modulation: &ModulationParameters);
    fn set_pan(&mut self, pan: f32);
    fn pan(&self) -> f32;
    /// Begin sounding at `time` (ms) with the given effective amplitude.
    fn start(&mut self, time: f64, amplitude: f32);
    /// Begin the release phase. The voice keeps sounding until its own
    /// decay finishes; `is_done` reports when it has.
    fn stop(&mut self, time: f64);
    /// Render one block, accumulating into the active channels of `out`.
    fn process(&mut self, time: f64, out: &mut ChannelBuffer);
    /// Reset immediately to silence, discarding all playback state.
    fn clear(&mut self);
    fn is_done(&self, time: f64) -> bool;
}

/// Which built-in voice kind a parameter bundle selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceKind {
    Oscillator,
    Sampler,
}

/// Tagged voice-kind selection, fixed for the pool's lifetime.
///
/// The variant both names the kind and carries its parameters, so a
/// kind/parameter mismatch cannot be constructed.
#[derive(Clone)]
pub enum VoiceParams {
    Oscillator(OscillatorParams),
    Sampler(SamplerParams),
}

impl VoiceParams {
    pub fn kind(&self) -> VoiceKind {
        match self {
            VoiceParams::Oscillator(_) => VoiceKind::Oscillator,
            VoiceParams::Sampler(_) => VoiceKind::Sampler,
        }
    }
}

/// Build one voice of the selected kind.
pub fn make_voice(params: &VoiceParams, sample_rate: u32) -> Box<dyn Voice> {
    match params {
        VoiceParams::Oscillator(p) => Box::new(OscillatorVoice::new(p.clone(), sample_rate)),
        VoiceParams::Sampler(p) => Box::new(SampleVoice::new(p.clone(), sample_rate)),
    }
}
