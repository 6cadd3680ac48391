//! PolyphonyMgr: fixed-pool voice allocation and mixing.
//!
//! One manager drives one polyphonic instrument. All calls happen
//! serially on the audio thread; there is no locking here because
//! nothing else ever touches the pool. The pool and fade ring are
//! pre-sized at construction, so the steady-state path never allocates.

use alloc::boxed::Box;
use alloc::vec::Vec;
use arrayvec::ArrayVec;
use pb_ir::{ChannelBuffer, ModulationParameters, NoteReceiver, MAX_PITCH};

use crate::fade::FadeMixer;
use crate::voice::{make_voice, Voice, VoiceParams};

/// Number of voice slots in a pool.
pub const NUM_VOICES: usize = 16;

/// One slot: a voice plus the note bookkeeping the allocator needs.
struct VoiceSlot {
    voice: Box<dyn Voice>,
    /// Pitch currently owned by this slot; `None` = free.
    pitch: Option<u8>,
    /// When the slot was last (re)started. Only used to pick the oldest
    /// slot under stealing.
    start_time: f64,
}

/// Polyphonic voice pool with round-robin allocation, oldest-note
/// stealing, and crossfaded slot reuse.
pub struct PolyphonyMgr {
    slots: ArrayVec<VoiceSlot, NUM_VOICES>,
    allow_stealing: bool,
    last_voice: Option<usize>,
    fade: FadeMixer,
}

impl PolyphonyMgr {
    /// Build a full pool of `NUM_VOICES` voices of the selected kind.
    /// The kind is fixed for the pool's lifetime.
    pub fn new(sample_rate: u32, params: &VoiceParams) -> Self {
        let mut slots = ArrayVec::new();
        for _ in 0..NUM_VOICES {
            slots.push(VoiceSlot {
                voice: make_voice(params, sample_rate),
                pitch: None,
                start_time: 0.0,
            });
        }
        Self {
            slots,
            allow_stealing: true,
            last_voice: None,
            fade: FadeMixer::new(),
        }
    }

    /// Build a pool from caller-supplied voices (custom voice types).
    /// At most `NUM_VOICES` are kept.
    pub fn from_voices(voices: Vec<Box<dyn Voice>>) -> Self {
        let mut slots = ArrayVec::new();
        for voice in voices.into_iter().take(NUM_VOICES) {
            slots.push(VoiceSlot {
                voice,
                pitch: None,
                start_time: 0.0,
            });
        }
        Self {
            slots,
            allow_stealing: true,
            last_voice: None,
            fade: FadeMixer::new(),
        }
    }

    pub fn allow_stealing(&self) -> bool {
        self.allow_stealing
    }

    pub fn set_allow_stealing(&mut self, allow: bool) {
        self.allow_stealing = allow;
    }

    /// Number of slots currently holding a note.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.pitch.is_some()).count()
    }

    /// Pitch held by slot `index`, if any.
    pub fn pitch_of(&self, index: usize) -> Option<u8> {
        self.slots.get(index).and_then(|s| s.pitch)
    }

    pub fn num_voices(&self) -> usize {
        self.slots.len()
    }

    /// Start a note, selecting exactly one slot to carry it.
    ///
    /// Selection priority: an explicitly hinted slot that is live, then
    /// a slot already sounding the same pitch, then a free slot scanned
    /// round-robin from just past the last-used slot, then the oldest
    /// slot if stealing is enabled. With the pool full and stealing
    /// disabled the call is a deliberate silent drop.
    ///
    /// `amplitude` is squared before reaching the voice to weight
    /// velocity perceptually. A hint outside the pool is treated as no
    /// hint. Assumes `pitch` is already validated to 0..=127.
    pub fn start(
        &mut self,
        time: f64,
        pitch: u8,
        amplitude: f32,
        voice_index: Option<usize>,
        modulation: &ModulationParameters,
    ) {
        let n = self.slots.len();
        if n == 0 {
            return;
        }
        let amount = amplitude * amplitude;

        let hint = voice_index.filter(|&i| i < n);
        let mut preserve_voice = hint.is_some_and(|i| self.slots[i].pitch.is_some());
        let mut chosen = hint;

        if chosen.is_none() {
            // Retrigger: reuse the slot already sounding this pitch.
            if let Some(i) = self.slots.iter().position(|s| s.pitch == Some(pitch)) {
                chosen = Some(i);
                preserve_voice = true;
            }
        }

        if chosen.is_none() {
            // Keep incrementing through the pool so old voices get time
            // to finish their release before being reused.
            let base = self.last_voice.map_or(0, |last| last + 1);
            for k in 0..n {
                let check = (base + k) % n;
                if self.slots[check].pitch.is_none() {
                    chosen = Some(check);
                    break;
                }
            }
        }

        let index = match chosen {
            Some(i) => i,
            None => {
                if !self.allow_stealing {
                    return;
                }
                let mut oldest = 0;
                for i in 1..n {
                    if self.slots[i].start_time < self.slots[oldest].start_time {
                        oldest = i;
                    }
                }
                oldest
            }
        };

        let slot = &mut self.slots[index];
        let voice = slot.voice.as_mut();
        voice.set_pitch(pitch);
        voice.set_modulators(modulation);
        if !preserve_voice || modulation.pan != voice.pan() {
            // Hard transition: bank the outgoing tail, then silence the
            // voice before the new note so there is no discontinuity.
            self.fade.capture(time, voice);
            voice.clear();
        }
        voice.start(time, amount);
        voice.set_pan(modulation.pan);
        self.last_voice = Some(index);

        slot.pitch = Some(pitch);
        slot.start_time = time;
    }

    /// Signal release on every slot sounding `pitch`. Slots stay
    /// assigned until their voice reports done.
    pub fn stop(&mut self, time: f64, pitch: u8) {
        for slot in &mut self.slots {
            if slot.pitch == Some(pitch) {
                slot.voice.stop(time);
            }
        }
    }

    /// Render one block: every voice accumulates into `out`, finished
    /// notes free their slots, and the fade ring drains its tail.
    ///
    /// A voice that never reports done permanently occupies its slot;
    /// that failure mode is not detected here.
    pub fn process(&mut self, time: f64, out: &mut ChannelBuffer, frames: usize) {
        self.fade.set_active_channels(out.active_channels());

        for slot in &mut self.slots {
            slot.voice.process(time, out);

            if slot.pitch.is_some() && slot.voice.is_done(time) {
                slot.pitch = None;
            }
        }

        self.fade.drain(out, frames);
    }
}

impl NoteReceiver for PolyphonyMgr {
    /// Note events enter here: velocity 0 releases the pitch, anything
    /// else starts it. Out-of-range pitches are rejected silently.
    fn play_note(
        &mut self,
        time: f64,
        pitch: u8,
        velocity: u8,
        voice_index: Option<usize>,
        modulation: &ModulationParameters,
    ) {
        if pitch > MAX_PITCH {
            return;
        }
        if velocity == 0 {
            self.stop(time, pitch);
        } else {
            let amplitude = velocity as f32 / 127.0;
            self.start(time, pitch, amplitude, voice_index, modulation);
        }
    }
}
