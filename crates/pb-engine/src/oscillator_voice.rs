//! Minimal sine voice.
//!
//! Kept deliberately small: a phase-accumulator sine with a linear
//! release ramp, enough to give the pool a real voice to drive. Honors
//! the per-voice modulation contract at block rate (pitch bend in
//! semitones, pressure as a gain lift, pan as a stereo split).

use core::f32::consts::TAU;

use pb_ir::{pitch_to_frequency, ChannelBuffer, ModulationParameters};

use crate::voice::Voice;

/// Parameters shared by every oscillator voice in a pool.
#[derive(Clone, Debug)]
pub struct OscillatorParams {
    pub gain: f32,
    /// Release ramp duration after note-off, in milliseconds.
    pub release_ms: f32,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            gain: 0.25,
            release_ms: 50.0,
        }
    }
}

/// A sine voice with an immediate attack and linear release.
pub struct OscillatorVoice {
    params: OscillatorParams,
    sample_rate: u32,
    pitch: u8,
    modulation: ModulationParameters,
    pan: f32,
    phase: f32,
    amplitude: f32,
    active: bool,
    stop_time: Option<f64>,
}

impl OscillatorVoice {
    pub fn new(params: OscillatorParams, sample_rate: u32) -> Self {
        Self {
            params,
            sample_rate,
            pitch: 0,
            modulation: ModulationParameters::default(),
            pan: 0.0,
            phase: 0.0,
            amplitude: 0.0,
            active: false,
            stop_time: None,
        }
    }

    /// Release envelope level at `time`: 1.0 while held, ramping
    /// linearly to 0.0 over `release_ms` after note-off.
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

/// Linear stereo pan weights for pan in -1..1. Center is equal halves.
pub(crate) fn pan_gains(pan: f32) -> (f32, f32) {
    (0.5 * (1.0 - pan), 0.5 * (1.0 + pan))
}

impl Voice for OscillatorVoice {
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
        self.active = true;
        self.stop_time = None;
    }

    fn stop(&mut self, time: f64) {
        self.stop_time = Some(time);
    }

    fn process(&mut self, time: f64, out: &mut ChannelBuffer) {
        if !self.active {
            return;
        }

        // Modulation is block rate: sample the sources once up front.
        let freq = pitch_to_frequency(self.pitch as f32 + self.modulation.bend(0));
        let phase_inc = TAU * freq / self.sample_rate as f32;
        let gain = self.amplitude * self.params.gain * (1.0 + self.modulation.pressure(0));
        let (left_gain, right_gain) = pan_gains(self.pan);
        let stereo = out.active_channels() >= 2;
        let ms_per_sample = 1000.0 / self.sample_rate as f64;

        for i in 0..out.frames() {
            let env = self.envelope_level(time + i as f64 * ms_per_sample);
            if env <= 0.0 {
                self.active = false;
                break;
            }
            let s = libm::sinf(self.phase) * gain * env;
            self.phase += phase_inc;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
            if stereo {
                out.channel_mut(0)[i] += s * left_gain;
                out.channel_mut(1)[i] += s * right_gain;
            } else {
                out.channel_mut(0)[i] += s;
            }
        }
    }

    fn clear(&mut self) {
        self.phase = 0.0;
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
