//! Canvas playback: turning recorded notes into edge-triggered events.
//!
//! Once per audio block the player samples the canvas at the transport's
//! current loop position and compares the resulting per-pitch "on" array
//! against the previous block's. A lane going on fires exactly one
//! note-on; a lane going off fires exactly one note-off (velocity 0).
//! Level state never re-fires — edges only.

use pb_ir::{ModulationParameters, NoteCanvas, NoteReceiver, PitchMask, Transport, PITCH_COUNT};

/// Plays a [`NoteCanvas`] against the transport, emitting note events
/// into a [`NoteReceiver`].
pub struct CanvasPlayer {
    canvas: NoteCanvas,
    playing: bool,
    last: PitchMask,
    /// Voice routing of the note currently sounding on each lane, so
    /// the note-off targets the same voice slot the note-on did.
    voice_hints: [Option<usize>; PITCH_COUNT],
}

impl CanvasPlayer {
    pub fn new(canvas: NoteCanvas) -> Self {
        Self {
            canvas,
            playing: true,
            last: PitchMask::empty(),
            voice_hints: [None; PITCH_COUNT],
        }
    }

    pub fn canvas(&self) -> &NoteCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut NoteCanvas {
        &mut self.canvas
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Normalized position 0..1 within the canvas loop.
    pub fn position(&self, transport: &Transport) -> f32 {
        let measures = self.canvas.measures() as u64;
        let within = (transport.measure() % measures) as f64 + transport.measure_pos();
        (within / measures as f64) as f32
    }

    /// Run one block of edge detection at the transport's position.
    pub fn advance(&mut self, transport: &Transport, sink: &mut dyn NoteReceiver) {
        if !self.playing {
            return;
        }

        let time = transport.time_ms();
        let pos = self.position(transport);
        let now = self.canvas.active_mask(pos);

        for pitch in 0..PITCH_COUNT {
            let was_on = self.last.get(pitch);
            let now_on = now.get(pitch);
            if was_on && !now_on {
                let hint = self.voice_hints[pitch].take();
                sink.play_note(time, pitch as u8, 0, hint, &ModulationParameters::default());
            }
            if now_on && !was_on {
                if let Some(note) = self.canvas.note_at(pos, pitch as u8) {
                    let velocity = velocity_byte(note.velocity);
                    self.voice_hints[pitch] = note.voice_index;
                    sink.play_note(time, pitch as u8, velocity, note.voice_index, &note.modulation);
                }
            }
        }

        self.last = now;
    }

    /// Release everything currently sounding (playback disabled, canvas
    /// cleared out from under us, and so on).
    pub fn flush(&mut self, transport: &Transport, sink: &mut dyn NoteReceiver) {
        let time = transport.time_ms();
        for pitch in 0..PITCH_COUNT {
            if self.last.get(pitch) {
                let hint = self.voice_hints[pitch].take();
                sink.play_note(time, pitch as u8, 0, hint, &ModulationParameters::default());
            }
        }
        self.last = PitchMask::empty();
    }
}

/// Map normalized velocity to the wire range, keeping note-ons nonzero
/// (zero is reserved as the off signal).
fn velocity_byte(velocity: f32) -> u8 {
    let v = (velocity * 127.0) as i32;
    v.clamp(1, 127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_ir::CanvasNote;

    #[derive(Default)]
    struct Recorder {
        events: Vec<(f64, u8, u8, Option<usize>)>,
    }

    impl NoteReceiver for Recorder {
        fn play_note(
            &mut self,
            time: f64,
            pitch: u8,
            velocity: u8,
            voice_index: Option<usize>,
            _modulation: &ModulationParameters,
        ) {
            self.events.push((time, pitch, velocity, voice_index));
        }
    }

    /// Transport positioned so the canvas loop position is `pos`.
    fn transport_at(pos: f64) -> Transport {
        let mut t = Transport::new(44100, 120.0);
        t.advance((pos * t.samples_per_measure()) as usize);
        t
    }

    #[test]
    fn edges_fire_exactly_once() {
        // One note on pitch 60 covering positions [0.25, 0.75).
        let mut canvas = NoteCanvas::new(1);
        canvas.add(CanvasNote::new(60, 0.25, 0.5, 1.0));
        let mut player = CanvasPlayer::new(canvas);
        let mut rec = Recorder::default();

        // Four blocks: off, on, on, off.
        for pos in [0.1, 0.3, 0.6, 0.9] {
            player.advance(&transport_at(pos), &mut rec);
        }

        let ons: Vec<_> = rec.events.iter().filter(|e| e.2 > 0).collect();
        let offs: Vec<_> = rec.events.iter().filter(|e| e.2 == 0).collect();
        assert_eq!(ons.len(), 1);
        assert_eq!(offs.len(), 1);
        assert_eq!(ons[0].1, 60);
        assert_eq!(offs[0].1, 60);
    }

    #[test]
    fn sustained_note_does_not_refire() {
        let mut canvas = NoteCanvas::new(1);
        canvas.add(CanvasNote::new(60, 0.0, 0.9, 1.0));
        let mut player = CanvasPlayer::new(canvas);
        let mut rec = Recorder::default();

        for pos in [0.1, 0.2, 0.3, 0.4, 0.5] {
            player.advance(&transport_at(pos), &mut rec);
        }
        assert_eq!(rec.events.len(), 1);
    }

    #[test]
    fn note_off_carries_the_on_events_voice_index() {
        let mut canvas = NoteCanvas::new(1);
        let mut note = CanvasNote::new(64, 0.2, 0.3, 0.5);
        note.voice_index = Some(7);
        canvas.add(note);
        let mut player = CanvasPlayer::new(canvas);
        let mut rec = Recorder::default();

        player.advance(&transport_at(0.3), &mut rec);
        player.advance(&transport_at(0.8), &mut rec);

        assert_eq!(rec.events.len(), 2);
        assert_eq!(rec.events[0].3, Some(7));
        assert_eq!(rec.events[1].2, 0);
        assert_eq!(rec.events[1].3, Some(7));
    }

    #[test]
    fn velocity_scales_to_midi_range() {
        let mut canvas = NoteCanvas::new(1);
        canvas.add(CanvasNote::new(60, 0.0, 0.5, 1.0));
        canvas.add(CanvasNote::new(61, 0.0, 0.5, 0.5));
        let mut player = CanvasPlayer::new(canvas);
        let mut rec = Recorder::default();

        player.advance(&transport_at(0.25), &mut rec);
        let v60 = rec.events.iter().find(|e| e.1 == 60).unwrap().2;
        let v61 = rec.events.iter().find(|e| e.1 == 61).unwrap().2;
        assert_eq!(v60, 127);
        assert_eq!(v61, 63);
    }

    #[test]
    fn velocity_never_maps_note_on_to_zero() {
        assert_eq!(velocity_byte(0.0), 1);
        assert_eq!(velocity_byte(0.001), 1);
        assert_eq!(velocity_byte(1.0), 127);
    }

    #[test]
    fn paused_player_emits_nothing() {
        let mut canvas = NoteCanvas::new(1);
        canvas.add(CanvasNote::new(60, 0.0, 1.0, 1.0));
        let mut player = CanvasPlayer::new(canvas);
        player.set_playing(false);
        let mut rec = Recorder::default();
        player.advance(&transport_at(0.5), &mut rec);
        assert!(rec.events.is_empty());
    }

    #[test]
    fn flush_releases_sounding_lanes() {
        let mut canvas = NoteCanvas::new(1);
        canvas.add(CanvasNote::new(60, 0.0, 0.9, 1.0));
        let mut player = CanvasPlayer::new(canvas);
        let mut rec = Recorder::default();

        let t = transport_at(0.5);
        player.advance(&t, &mut rec);
        player.flush(&t, &mut rec);

        assert_eq!(rec.events.len(), 2);
        assert_eq!(rec.events[1].2, 0);

        // Flushed lanes are forgotten: nothing re-fires off.
        player.flush(&t, &mut rec);
        assert_eq!(rec.events.len(), 2);
    }

    #[test]
    fn loop_wrap_retriggers_note() {
        let mut canvas = NoteCanvas::new(1);
        canvas.add(CanvasNote::new(60, 0.1, 0.2, 1.0));
        let mut player = CanvasPlayer::new(canvas);
        let mut rec = Recorder::default();

        // First pass through the loop, then around again.
        for pos in [0.2, 0.5, 1.2, 1.5] {
            player.advance(&transport_at(pos), &mut rec);
        }
        let ons = rec.events.iter().filter(|e| e.2 > 0).count();
        assert_eq!(ons, 2);
    }
}
