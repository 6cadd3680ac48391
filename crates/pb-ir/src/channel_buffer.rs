//! Multichannel f32 audio buffer with planar layout.

use alloc::vec;
use alloc::vec::Vec;

/// Maximum number of audio channels per buffer.
pub const MAX_CHANNELS: u16 = 8;

/// A multichannel f32 audio buffer in planar layout.
///
/// Data is stored as `capacity_channels` contiguous planes of `frames`
/// samples each. The *active* channel count can be lowered or raised per
/// block (up to the capacity fixed at construction) without touching the
/// allocation, so the realtime path never resizes.
#[derive(Clone, Debug)]
pub struct ChannelBuffer {
    data: Vec<f32>,
    capacity_channels: u16,
    active_channels: u16,
    frames: usize,
}

impl ChannelBuffer {
    /// Create a new silent buffer with the given active channel count and
    /// frame count. Capacity is `MAX_CHANNELS` planes.
    pub fn new(channels: u16, frames: usize) -> Self {
        let channels = channels.min(MAX_CHANNELS);
        Self {
            data: vec![0.0; MAX_CHANNELS as usize * frames],
            capacity_channels: MAX_CHANNELS,
            active_channels: channels,
            frames,
        }
    }

    /// Fill all samples (active or not) with zero.
    pub fn silence(&mut self) {
        self.data.fill(0.0);
    }

    /// Number of currently active channels.
    pub fn active_channels(&self) -> u16 {
        self.active_channels
    }

    /// Change the active channel count. Clamped to buffer capacity.
    ///
    /// Newly activated planes may hold stale samples; callers that bring
    /// channels back online mid-session should `silence()` first.
    pub fn set_active_channels(&mut self, channels: u16) {
        self.active_channels = channels.min(self.capacity_channels);
    }

    /// Number of frames per channel.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Read-only access to one channel's sample data.
    pub fn channel(&self, ch: u16) -> &[f32] {
        let start = ch as usize * self.frames;
        &self.data[start..start + self.frames]
    }

    /// Mutable access to one channel's sample data.
    pub fn channel_mut(&mut self, ch: u16) -> &mut [f32] {
        let start = ch as usize * self.frames;
        let len = self.frames;
        &mut self.data[start..start + len]
    }

    /// Sum the active channels of `source` into this buffer.
    pub fn accumulate(&mut self, source: &ChannelBuffer) {
        let chs = self.active_channels.min(source.active_channels);
        let frs = self.frames.min(source.frames);
        for ch in 0..chs {
            let dst = self.channel_mut(ch);
            let src = source.channel(ch);
            for i in 0..frs {
                dst[i] += src[i];
            }
        }
    }

    /// Scale all active samples by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        for ch in 0..self.active_channels {
            for s in self.channel_mut(ch) {
                *s *= gain;
            }
        }
    }
}
