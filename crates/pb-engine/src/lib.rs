//! Polyphonic voice allocation and mixing engine for patchbay.
//!
//! The centerpiece is [`PolyphonyMgr`]: a fixed pool of synthesis
//! voices allocated across overlapping notes with round-robin reuse,
//! oldest-note stealing, and click-free crossfades on slot
//! reassignment. [`CanvasPlayer`] turns a recorded note canvas into
//! edge-triggered note events against the transport, and [`Engine`]
//! wires the two together for block processing on a single audio
//! thread.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
mod controls;
mod engine;
mod fade;
mod oscillator_voice;
mod poly;
mod router;
mod sample_voice;
mod voice;

#[cfg(feature = "std")]
pub use controls::{BlockControl, ControlBank, ControlKey};
pub use engine::Engine;
pub use fade::{FadeMixer, VOICE_FADE_SAMPLES};
pub use oscillator_voice::{OscillatorParams, OscillatorVoice};
pub use poly::{PolyphonyMgr, NUM_VOICES};
pub use router::CanvasPlayer;
pub use sample_voice::{SampleVoice, SamplerParams};
pub use voice::{make_voice, Voice, VoiceKind, VoiceParams};
