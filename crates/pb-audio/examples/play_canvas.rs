//! Plays a looping note canvas through the default audio device.
//!
//! Usage:
//!   cargo run --example play_canvas -- [measures] [tempo]

use pb_audio::{AudioOutput, CpalOutput, Frame};
use pb_engine::{Engine, OscillatorParams, VoiceParams};
use pb_ir::{CanvasNote, ChannelBuffer};
use std::env;
use std::io::Write;

const BLOCK_FRAMES: usize = 256;

fn main() {
    let args: Vec<String> = env::args().collect();
    let measures: u32 = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(4);
    let tempo: f32 = args.get(2).and_then(|a| a.parse().ok()).unwrap_or(120.0);

    let (mut output, consumer) = CpalOutput::new().unwrap_or_else(|e| {
        eprintln!("Failed to initialize audio: {}", e);
        std::process::exit(1);
    });

    let sample_rate = output.sample_rate();
    println!("Sample rate: {} Hz, tempo: {} BPM", sample_rate, tempo);

    let mut engine = Engine::new(
        sample_rate,
        tempo,
        &VoiceParams::Oscillator(OscillatorParams::default()),
    );

    // A one-measure arpeggio with a sustained bass note underneath.
    engine.canvas_mut().add(CanvasNote::new(36, 0.0, 1.0, 0.7));
    for (i, pitch) in [60u8, 64, 67, 72, 67, 64, 60, 55].iter().enumerate() {
        let start = i as f32 / 8.0;
        engine
            .canvas_mut()
            .add(CanvasNote::new(*pitch, start, 0.11, 0.9));
    }
    engine.play();

    output.build_stream(consumer).unwrap_or_else(|e| {
        eprintln!("Failed to start audio stream: {}", e);
        std::process::exit(1);
    });
    output.start().unwrap();

    println!("Playing {} measures...", measures);

    let mut block = ChannelBuffer::new(2, BLOCK_FRAMES);
    while engine.transport().measure() < measures as u64 {
        block.silence();
        engine.process_block(&mut block);
        push_block(&mut output, &block);
        print!("\rMeasure: {:>3}", engine.transport().measure() + 1);
        let _ = std::io::stdout().flush();
    }

    engine.stop();
    // Release tails, then a short run of silence so the ring buffer flushes.
    for _ in 0..32 {
        block.silence();
        engine.process_block(&mut block);
        push_block(&mut output, &block);
    }

    println!("\rDone.        ");
}

/// Blocking push so playback never skips frames.
fn push_block(output: &mut CpalOutput, block: &ChannelBuffer) {
    let left = block.channel(0);
    let right = block.channel(1);
    for i in 0..block.frames() {
        output.write_spin(Frame::new(left[i], right[i]));
    }
}
