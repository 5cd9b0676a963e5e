//! Renders a step sequenced pattern with the four analog modeled drum voices and writes the
//! result to a WAV file.

use std::error::Error;

use stratus::{
    drums::{DrumMixer, DrumVoice, FmDrumMode},
    AudioUnit, ParameterValueUpdate,
};

// -------------------------------------------------------------------------------------------------

const SAMPLE_RATE: u32 = 44100;

const OUTPUT_PATH: &str = "render-drums.wav";

/// Pattern step length in frames: 16th notes at 120 bpm.
const STEP_FRAMES: usize = (SAMPLE_RATE / 8) as usize;
const STEPS_PER_BAR: usize = 16;
const BARS: usize = 4;

#[rustfmt::skip]
const BASS_PATTERN: [u8; STEPS_PER_BAR] = [
    1, 0, 0, 0,  1, 0, 0, 0,  1, 0, 0, 0,  1, 0, 0, 1,
];
#[rustfmt::skip]
const SNARE_PATTERN: [u8; STEPS_PER_BAR] = [
    0, 0, 0, 0,  1, 0, 0, 0,  0, 0, 0, 0,  1, 0, 0, 0,
];
#[rustfmt::skip]
const HI_HAT_PATTERN: [u8; STEPS_PER_BAR] = [
    1, 0, 1, 0,  1, 0, 1, 1,  1, 0, 1, 0,  1, 0, 1, 1,
];
#[rustfmt::skip]
const FM_PATTERN: [u8; STEPS_PER_BAR] = [
    0, 0, 0, 0,  0, 0, 1, 0,  0, 0, 0, 0,  0, 1, 0, 0,
];

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    let mut mixer = DrumMixer::new(SAMPLE_RATE)?;
    mixer.initialize(SAMPLE_RATE, STEP_FRAMES)?;
    let gate_channels = mixer.input_channels();

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(OUTPUT_PATH, spec)?;

    let mut gates = vec![0.0; STEP_FRAMES * gate_channels];
    let mut output = vec![0.0; STEP_FRAMES];

    log::info!("Rendering {} bars...", BARS);
    for bar in 0..BARS {
        if bar == BARS / 2 {
            log::info!("Switching the FM drum to its metallic mode");
            mixer.process_parameter_update(
                DrumMixer::FM_MODE_ID,
                &ParameterValueUpdate::Raw(Box::new(FmDrumMode::Metal)),
            )?;
        }

        for step in 0..STEPS_PER_BAR {
            gates.fill(0.0);
            let step_gates = [
                (DrumVoice::BassDrum, BASS_PATTERN[step]),
                (DrumVoice::SnareDrum, SNARE_PATTERN[step]),
                (DrumVoice::HiHat, HI_HAT_PATTERN[step]),
                (DrumVoice::FmDrum, FM_PATTERN[step]),
            ];
            for (voice, gate) in step_gates {
                if gate != 0 {
                    // hold the gate high for the first half of the step
                    for frame in 0..STEP_FRAMES / 2 {
                        gates[frame * gate_channels + voice as usize] = 1.0;
                    }
                }
            }

            mixer.process(&gates, &mut output);
            for sample in &output {
                writer.write_sample(*sample)?;
            }
        }
    }

    writer.finalize()?;
    log::info!("Wrote '{}'", OUTPUT_PATH);

    Ok(())
}
