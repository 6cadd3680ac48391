//! Repitched sample-playback voice.

use alloc::sync::Arc;

use pb_ir::{pitch_to_frequency, ChannelBuffer, ModulationParameters};

use crate::oscillator_voice::pan_gains;
use crate::voice::Voice;

/// Parameters shared by every sampler voice in a pool.
#[derive(Clone)]
pub struct SamplerParams {
    /// Mono source material, shared across the pool.
    pub sample: Arc<[f32]>,
    /// The pitch at which the sample plays back at its recorded rate.
    pub root_pitch: u8,
    pub gain: f32,
    /// Release ramp duration after note-off, in milliseconds.
    pub release_ms: f32,
}

impl SamplerParams {
    pub fn from_data(data: &[f32], root_pitch: u8) -> Self {
        Self {
            sample: data.into(),
            root_pitch,
            gain: 1.0,
            release_ms: 50.0,
        }
    }
}

/// Plays a shared mono sample, repitched by the note's frequency ratio
/// to the root pitch. Stops naturally at the end of the material.
pub struct SampleVoice {
    params: SamplerParams,
    sample_rate: u32,
    pitch: u8,
    modulation: ModulationParameters,
    pan: f32,
    position: f64,
    amplitude: f32,
    active: bool,
    stop_time: Option<f64>,
}

impl SampleVoice {
    pub fn new(params: SamplerParams, sample_rate: u32) -> Self {
        Self {
            params,
            sample_rate,
            pitch: 0,
            modulation: ModulationParameters::default(),
            pan: 0.0,
            position: 0.0,
            amplitude: 0.0,
            active: false,
            stop_time: None,
        }
    }

    fn envelope_level(&self, time: f64) -> f32 {
        match self.stop_time {
            None => 1.0,
            Some(stop) => {
                let elapsed = (time - stop).max(0.0) as f32;
                (1.0 - elapsed / self.params.release_ms).max(0.0)
            }
        }
    }
}

impl Voice for SampleVoice {
    fn set_pitch(&mut self, pitch: u8) {
        self.pitch = pitch;
    }

    fn set_modulators(&mut self, modulation: &ModulationParameters) {
        self.modulation = modulation.clone();
    }

    fn set_pan(&mut self, pan: f32) {
        self.pan = pan;
    }

    fn pan(&self) -> f32 {
        self.pan
    }

    fn start(&mut self, _time: f64, amplitude: f32) {
        self.amplitude = amplitude;
        self.position = 0.0;
        self.active = true;
        self.stop_time = None;
    }

    fn stop(&mut self, time: f64) {
        self.stop_time = Some(time);
    }

    fn process(&mut self, time: f64, out: &mut ChannelBuffer) {
        if !self.active || self.params.sample.is_empty() {
            return;
        }

        let note = pitch_to_frequency(self.pitch as f32 + self.modulation.bend(0));
        let root = pitch_to_frequency(self.params.root_pitch as f32);
        let step = (note / root) as f64;
        let gain = self.amplitude * self.params.gain * (1.0 + self.modulation.pressure(0));
        let (left_gain, right_gain) = pan_gains(self.pan);
        let stereo = out.active_channels() >= 2;
        let ms_per_sample = 1000.0 / self.sample_rate as f64;

        for i in 0..out.frames() {
            let idx = self.position as usize;
            if idx >= self.params.sample.len() {
                self.active = false;
                break;
            }
            let env = self.envelope_level(time + i as f64 * ms_per_sample);
            if env <= 0.0 {
                self.active = false;
                break;
            }
            let s = self.params.sample[idx] * gain * env;
            self.position += step;
            if stereo {
                out.channel_mut(0)[i] += s * left_gain;
                out.channel_mut(1)[i] += s * right_gain;
            } else {
                out.channel_mut(0)[i] += s;
            }
        }
    }

    fn clear(&mut self) {
        self.position = 0.0;
        self.amplitude = 0.0;
        self.active = false;
        self.stop_time = None;
    }

    fn is_done(&self, time: f64) -> bool {
        if !self.active {
            return true;
        }
        match self.stop_time {
            Some(stop) => time >= stop + self.params.release_ms as f64,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SamplerParams {
        SamplerParams::from_data(&[1.0; 1000], 60)
    }

    #[test]
    fn plays_sample_data() {
        let mut v = SampleVoice::new(params(), 44100);
        v.set_pitch(60);
        v.start(0.0, 1.0);
        let mut buf = ChannelBuffer::new(2, 16);
        v.process(0.0, &mut buf);
        assert!(buf.channel(0).iter().all(|&s| s > 0.0));
        assert_eq!(buf.channel(0)[0], buf.channel(1)[0]);
    }

    #[test]
    fn stops_at_end_of_material() {
        let mut v = SampleVoice::new(SamplerParams::from_data(&[1.0; 8], 60), 44100);
        v.set_pitch(60);
        v.start(0.0, 1.0);
        let mut buf = ChannelBuffer::new(2, 64);
        v.process(0.0, &mut buf);
        assert!(v.is_done(0.0));
        assert_eq!(buf.channel(0)[8], 0.0);
    }

    #[test]
    fn octave_up_doubles_step() {
        let mut v = SampleVoice::new(params(), 44100);
        v.set_pitch(72);
        v.start(0.0, 1.0);
        let mut buf = ChannelBuffer::new(2, 10);
        v.process(0.0, &mut buf);
        assert!((v.position - 20.0).abs() < 0.1);
    }

    #[test]
    fn amplitude_scales_output() {
        let render = |amp: f32| {
            let mut v = SampleVoice::new(params(), 44100);
            v.set_pitch(60);
            v.start(0.0, amp);
            let mut buf = ChannelBuffer::new(1, 4);
            v.process(0.0, &mut buf);
            buf.channel(0)[0]
        };
        let half = render(0.5);
        let full = render(1.0);
        assert!((full - half * 2.0).abs() < 1e-6);
    }
}
