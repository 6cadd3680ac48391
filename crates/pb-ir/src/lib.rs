//! Core data types for the patchbay voice engine.
//!
//! This crate defines the shared vocabulary the engine crates speak:
//! channel buffers, modulation parameters, note messages, the transport
//! clock, and the note-canvas data model. The engine consumes these
//! types; nothing here touches an audio device.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod canvas;
mod channel_buffer;
mod modulation;
mod note;
mod transport;

pub use canvas::{CanvasNote, NoteCanvas, PitchMask};
pub use channel_buffer::{ChannelBuffer, MAX_CHANNELS};
pub use modulation::{Constant, ModSignal, ModSource, ModulationParameters};
pub use note::{pitch_to_frequency, NoteReceiver, MAX_PITCH, PITCH_COUNT};
pub use transport::Transport;
