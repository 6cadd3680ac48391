//! Transport: the musical clock driving playback.
//!
//! The transport advances in whole samples on the audio thread and
//! exposes its position as measures (4/4) plus a normalized position
//! within the current measure. It also carries the logical time tag
//! (milliseconds since start) stamped onto every note event.

/// Sample-driven musical clock.
#[derive(Clone, Debug)]
pub struct Transport {
    sample_rate: u32,
    tempo: f32,
    beats_per_measure: u32,
    measure: u64,
    measure_pos: f64,
    elapsed_samples: u64,
}

impl Transport {
    /// Create a transport at the given sample rate and tempo (BPM), 4/4.
    pub fn new(sample_rate: u32, tempo: f32) -> Self {
        Self {
            sample_rate,
            tempo,
            beats_per_measure: 4,
            measure: 0,
            measure_pos: 0.0,
            elapsed_samples: 0,
        }
    }

    /// Samples spanned by one measure at the current tempo.
    pub fn samples_per_measure(&self) -> f64 {
        self.sample_rate as f64 * 60.0 / self.tempo as f64 * self.beats_per_measure as f64
    }

    /// Advance the clock by `frames` samples.
    pub fn advance(&mut self, frames: usize) {
        self.elapsed_samples += frames as u64;
        self.measure_pos += frames as f64 / self.samples_per_measure();
        while self.measure_pos >= 1.0 {
            self.measure_pos -= 1.0;
            self.measure += 1;
        }
    }

    /// Whole measures since start.
    pub fn measure(&self) -> u64 {
        self.measure
    }

    /// Normalized position within the current measure, 0..1.
    pub fn measure_pos(&self) -> f64 {
        self.measure_pos
    }

    /// Logical time in milliseconds since start.
    pub fn time_ms(&self) -> f64 {
        self.elapsed_samples as f64 * 1000.0 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    /// Change tempo. Position is preserved; only the rate of advance
    /// changes from here on.
    pub fn set_tempo(&mut self, tempo: f32) {
        self.tempo = tempo;
    }

    /// Rewind to the start.
    pub fn reset(&mut self) {
        self.measure = 0;
        self.measure_pos = 0.0;
        self.elapsed_samples = 0;
    }
}
