//! Engine: transport + canvas player + polyphony manager on one thread.

use pb_ir::{ChannelBuffer, NoteCanvas, Transport};

use crate::poly::PolyphonyMgr;
use crate::router::CanvasPlayer;
use crate::voice::VoiceParams;

#[cfg(feature = "std")]
use crate::controls::{BlockControl, ControlBank};
#[cfg(feature = "std")]
use std::sync::Arc;
#[cfg(feature = "std")]
use std::vec::Vec;

/// One polyphonic instrument: a note canvas played against the
/// transport into a voice pool. Everything here runs serially on the
/// audio thread; only the control bank crosses threads.
pub struct Engine {
    transport: Transport,
    player: CanvasPlayer,
    synth: PolyphonyMgr,
    #[cfg(feature = "std")]
    controls: Arc<ControlBank>,
    #[cfg(feature = "std")]
    control_scratch: Vec<Arc<dyn BlockControl>>,
}

impl Engine {
    pub fn new(sample_rate: u32, tempo: f32, params: &VoiceParams) -> Self {
        Self {
            transport: Transport::new(sample_rate, tempo),
            player: CanvasPlayer::new(NoteCanvas::new(1)),
            synth: PolyphonyMgr::new(sample_rate, params),
            #[cfg(feature = "std")]
            controls: Arc::new(ControlBank::new()),
            #[cfg(feature = "std")]
            control_scratch: Vec::new(),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    pub fn canvas(&self) -> &NoteCanvas {
        self.player.canvas()
    }

    pub fn canvas_mut(&mut self) -> &mut NoteCanvas {
        self.player.canvas_mut()
    }

    pub fn synth(&self) -> &PolyphonyMgr {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut PolyphonyMgr {
        &mut self.synth
    }

    /// Shared handle to the control registry for UI-thread use.
    #[cfg(feature = "std")]
    pub fn controls(&self) -> Arc<ControlBank> {
        self.controls.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn play(&mut self) {
        self.player.set_playing(true);
    }

    /// Stop playback, releasing everything that is sounding.
    pub fn stop(&mut self) {
        self.player.set_playing(false);
        self.player.flush(&self.transport, &mut self.synth);
    }

    /// Render one audio block into `out` (sized to the block).
    pub fn process_block(&mut self, out: &mut ChannelBuffer) {
        let frames = out.frames();

        #[cfg(feature = "std")]
        self.controls.compute_block(&mut self.control_scratch, 0);

        self.transport.advance(frames);
        self.player.advance(&self.transport, &mut self.synth);
        self.synth
            .process(self.transport.time_ms(), out, frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator_voice::OscillatorParams;
    use pb_ir::CanvasNote;

    fn engine_with_note() -> Engine {
        let mut engine = Engine::new(
            44100,
            120.0,
            &VoiceParams::Oscillator(OscillatorParams::default()),
        );
        // One measure loop, note across the middle half.
        engine.canvas_mut().add(CanvasNote::new(69, 0.25, 0.5, 1.0));
        engine
    }

    fn render_blocks(engine: &mut Engine, blocks: usize, frames: usize) -> f32 {
        let mut peak = 0.0f32;
        for _ in 0..blocks {
            let mut out = ChannelBuffer::new(2, frames);
            engine.process_block(&mut out);
            for &s in out.channel(0) {
                peak = peak.max(s.abs());
            }
        }
        peak
    }

    #[test]
    fn canvas_note_sounds_and_stops() {
        let mut engine = engine_with_note();
        // One measure at 120 BPM = 88200 samples = 172.3 blocks of 512.
        let silent_head = render_blocks(&mut engine, 30, 512);
        assert_eq!(silent_head, 0.0);

        let sounding = render_blocks(&mut engine, 60, 512);
        assert!(sounding > 0.0);

        // Past the note (and its release) the output decays to silence.
        render_blocks(&mut engine, 60, 512);
        let tail = render_blocks(&mut engine, 20, 512);
        assert_eq!(tail, 0.0);
    }

    #[test]
    fn note_retriggers_every_loop() {
        let mut engine = engine_with_note();
        let first_pass = render_blocks(&mut engine, 173, 512);
        assert!(first_pass > 0.0);
        // Second time around the loop it sounds again.
        let mut engine2_peak = 0.0f32;
        for _ in 0..173 {
            let mut out = ChannelBuffer::new(2, 512);
            engine.process_block(&mut out);
            for &s in out.channel(0) {
                engine2_peak = engine2_peak.max(s.abs());
            }
        }
        assert!(engine2_peak > 0.0);
    }

    #[test]
    fn stop_flushes_sounding_notes() {
        let mut engine = engine_with_note();
        render_blocks(&mut engine, 90, 512);
        assert!(engine.synth().active_count() > 0);

        engine.stop();
        // Release runs its course, then the slot frees.
        let mut out = ChannelBuffer::new(2, 512);
        for _ in 0..20 {
            engine.process_block(&mut out);
        }
        assert_eq!(engine.synth().active_count(), 0);
    }

    #[test]
    fn paused_engine_starts_no_notes() {
        let mut engine = engine_with_note();
        engine.stop();
        let peak = render_blocks(&mut engine, 200, 512);
        assert_eq!(peak, 0.0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn controls_compute_once_per_block() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counter(AtomicUsize);
        impl BlockControl for Counter {
            fn compute(&self, _samples_in: usize) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut engine = engine_with_note();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        engine.controls().insert(counter.clone());

        render_blocks(&mut engine, 5, 64);
        assert_eq!(counter.0.load(Ordering::Relaxed), 5);
    }
}
