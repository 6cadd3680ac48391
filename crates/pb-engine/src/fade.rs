//! Crossfade mixer: suppresses clicks when a voice slot is reassigned.
//!
//! When a sounding voice is about to be cut off for an unrelated note, a
//! short block of its outgoing audio is rendered once, weighted by a
//! linear 1→0 ramp, and summed into a fade-length ring buffer. Each
//! audio block drains the ring into the output at the matching modular
//! offsets and zeroes the consumed cells, so the tail plays out exactly
//! once while the slot's voice is already sounding the new note.

use pb_ir::ChannelBuffer;

use crate::voice::Voice;

/// Length of the fade-out tail in samples.
pub const VOICE_FADE_SAMPLES: usize = 50;

/// Ring buffer of outgoing amplitude-weighted voice tails.
pub struct FadeMixer {
    ring: ChannelBuffer,
    work: ChannelBuffer,
    pos: usize,
}

impl FadeMixer {
    pub fn new() -> Self {
        Self {
            ring: ChannelBuffer::new(2, VOICE_FADE_SAMPLES),
            work: ChannelBuffer::new(2, VOICE_FADE_SAMPLES),
            pos: 0,
        }
    }

    /// Follow the output buffer's channel layout for this block.
    pub fn set_active_channels(&mut self, channels: u16) {
        self.ring.set_active_channels(channels);
        self.work.set_active_channels(channels);
    }

    /// Render one fade-length block of `voice` at its current state and
    /// write it, ramped linearly from 1.0 down to 0.0, into the ring at
    /// the current write cursor.
    pub fn capture(&mut self, time: f64, voice: &mut dyn Voice) {
        self.work.silence();
        voice.process(time, &mut self.work);
        for i in 0..VOICE_FADE_SAMPLES {
            let fade = 1.0 - i as f32 / VOICE_FADE_SAMPLES as f32;
            let slot = (i + self.pos) % VOICE_FADE_SAMPLES;
            for ch in 0..self.ring.active_channels() {
                self.ring.channel_mut(ch)[slot] += self.work.channel(ch)[i] * fade;
            }
        }
    }

    /// Sum the current block of the ring into `out`, zero the consumed
    /// cells, and advance the write cursor by `frames`.
    pub fn drain(&mut self, out: &mut ChannelBuffer, frames: usize) {
        let channels = out.active_channels().min(self.ring.active_channels());
        for ch in 0..channels {
            let ring = self.ring.channel_mut(ch);
            let dst = out.channel_mut(ch);
            for i in 0..frames {
                let slot = (i + self.pos) % VOICE_FADE_SAMPLES;
                dst[i] += ring[slot];
                ring[slot] = 0.0;
            }
        }
        self.pos = (self.pos + frames) % VOICE_FADE_SAMPLES;
    }
}

impl Default for FadeMixer {
    fn default() -> Self {
        Self::new()
    }
}
