//! Renders a plucked arpeggio through the granular processor in all three playback modes and
//! writes the result to a WAV file.

use std::{error::Error, f32::consts::TAU};

use stratus::granular::{GranularParameters, GranularProcessor, PlaybackMode};

// -------------------------------------------------------------------------------------------------

const SAMPLE_RATE: u32 = 44100;
const BLOCK_FRAMES: usize = 512;

const OUTPUT_PATH: &str = "render-granular.wav";

/// Rendered length per playback mode, in seconds.
const SECONDS_PER_MODE: f32 = 6.0;
/// Length of the frozen, input-free tail at the end, in seconds.
const FREEZE_TAIL_SECONDS: f32 = 4.0;

// -------------------------------------------------------------------------------------------------

/// A simple plucked arpeggio, used as processor input.
fn pluck_signal(frame: u64) -> (f32, f32) {
    const NOTES: [f32; 4] = [220.0, 261.63, 329.63, 392.0];
    const PLUCK_FRAMES: u64 = SAMPLE_RATE as u64 / 2;

    let pluck = (frame / PLUCK_FRAMES) as usize;
    let frequency = NOTES[pluck % NOTES.len()];
    let envelope = (-4.0 * (frame % PLUCK_FRAMES) as f32 / PLUCK_FRAMES as f32).exp();
    let time = frame as f32 / SAMPLE_RATE as f32;
    let left = (TAU * frequency * time).sin() * envelope * 0.5;
    let right = (TAU * frequency * 1.002 * time).sin() * envelope * 0.5;
    (left, right)
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    let mut processor = GranularProcessor::new(SAMPLE_RATE, 2)?;

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(OUTPUT_PATH, spec)?;

    let mut input_left = vec![0.0; BLOCK_FRAMES];
    let mut input_right = vec![0.0; BLOCK_FRAMES];
    let mut output_left = vec![0.0; BLOCK_FRAMES];
    let mut output_right = vec![0.0; BLOCK_FRAMES];

    let mode_parameters = [
        GranularParameters {
            mode: PlaybackMode::Granular,
            position: 0.15,
            size: 0.4,
            pitch: 0.0,
            density: 0.7,
            texture: 0.5,
            dry_wet: 0.7,
            feedback: 0.2,
            freeze: false,
        },
        GranularParameters {
            mode: PlaybackMode::LoopingDelay,
            position: 0.3,
            size: 0.5,
            pitch: 0.0,
            density: 0.4,
            texture: 0.6,
            dry_wet: 0.6,
            feedback: 0.5,
            freeze: false,
        },
        GranularParameters {
            mode: PlaybackMode::Shimmer,
            position: 0.2,
            size: 0.6,
            pitch: 0.0,
            density: 0.6,
            texture: 0.4,
            dry_wet: 0.8,
            feedback: 0.4,
            freeze: false,
        },
    ];

    let mut frame_position = 0u64;
    let blocks_per_mode = (SECONDS_PER_MODE * SAMPLE_RATE as f32) as usize / BLOCK_FRAMES;

    for parameters in mode_parameters {
        log::info!("Rendering {} mode...", parameters.mode);
        processor.set_parameters(&parameters)?;

        for _ in 0..blocks_per_mode {
            for frame in 0..BLOCK_FRAMES {
                let (left, right) = pluck_signal(frame_position + frame as u64);
                input_left[frame] = left;
                input_right[frame] = right;
            }
            frame_position += BLOCK_FRAMES as u64;

            processor.process(&input_left, &input_right, &mut output_left, &mut output_right);

            for frame in 0..BLOCK_FRAMES {
                writer.write_sample(output_left[frame])?;
                writer.write_sample(output_right[frame])?;
            }
        }
    }

    // freeze the buffered audio and let the wet tail ring out without further input
    log::info!("Rendering frozen tail...");
    processor.set_freeze(true);
    processor.set_dry_wet(1.0);
    input_left.fill(0.0);
    input_right.fill(0.0);

    let tail_blocks = (FREEZE_TAIL_SECONDS * SAMPLE_RATE as f32) as usize / BLOCK_FRAMES;
    for _ in 0..tail_blocks {
        processor.process(&input_left, &input_right, &mut output_left, &mut output_right);
        for frame in 0..BLOCK_FRAMES {
            writer.write_sample(output_left[frame])?;
            writer.write_sample(output_right[frame])?;
        }
    }

    writer.finalize()?;
    log::info!("Wrote '{}'", OUTPUT_PATH);

    Ok(())
}
