//! Audio output trait and error types.

use pb_ir::ChannelBuffer;

/// One stereo output frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

/// Error type for audio operations.
#[derive(Debug)]
pub enum AudioError {
    /// Failed to initialize audio device
    DeviceInit(String),
    /// Failed to create audio stream
    StreamCreate(String),
    /// Playback error
    Playback(String),
    /// No audio device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::DeviceInit(msg) => write!(f, "Device init error: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "Stream create error: {}", msg),
            AudioError::Playback(msg) => write!(f, "Playback error: {}", msg),
            AudioError::NoDevice => write!(f, "No audio device available"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Trait for audio output backends.
pub trait AudioOutput {
    /// Get the sample rate.
    fn sample_rate(&self) -> u32;

    /// Write frames to the output. Non-blocking; frames that do not fit
    /// in the transport buffer are dropped.
    fn write(&mut self, frames: &[Frame]);

    /// Interleave a rendered block into the output. Channel 0 feeds the
    /// left side, channel 1 the right; mono buffers go to both sides.
    fn write_block(&mut self, block: &ChannelBuffer) {
        let left = block.channel(0);
        let right = if block.active_channels() > 1 {
            block.channel(1)
        } else {
            left
        };
        for i in 0..block.frames() {
            self.write(&[Frame::new(left[i], right[i])]);
        }
    }

    /// Start playback.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop playback.
    fn stop(&mut self) -> Result<(), AudioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CaptureOutput {
        frames: Vec<Frame>,
    }

    impl AudioOutput for CaptureOutput {
        fn sample_rate(&self) -> u32 {
            44100
        }

        fn write(&mut self, frames: &[Frame]) {
            self.frames.extend_from_slice(frames);
        }

        fn start(&mut self) -> Result<(), AudioError> {
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
    }

    #[test]
    fn write_block_interleaves_stereo() {
        let mut block = ChannelBuffer::new(2, 4);
        for i in 0..4 {
            block.channel_mut(0)[i] = i as f32;
            block.channel_mut(1)[i] = -(i as f32);
        }
        let mut out = CaptureOutput { frames: Vec::new() };
        out.write_block(&block);
        assert_eq!(out.frames.len(), 4);
        assert_eq!(out.frames[2], Frame::new(2.0, -2.0));
    }

    #[test]
    fn write_block_duplicates_mono() {
        let mut block = ChannelBuffer::new(1, 3);
        block.channel_mut(0)[1] = 0.5;
        let mut out = CaptureOutput { frames: Vec::new() };
        out.write_block(&block);
        assert_eq!(out.frames[1], Frame::new(0.5, 0.5));
    }
}
