use std::f32::consts::TAU;

use crate::utils::dsp::semitones_to_ratio;

// -------------------------------------------------------------------------------------------------

/// Selects the modulator tuning and mix weight of a [`FmDrum`].
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
)]
#[repr(u8)]
pub enum FmDrumMode {
    /// Harmonic 1:1 modulator for kick style sounds.
    #[default]
    Bass,
    /// Slightly detuned modulator for tom style sounds.
    Tom,
    /// Far off ratio modulator for clangorous metallic hits.
    Metal,
}

impl FmDrumMode {
    /// Modulator frequency as a ratio of the carrier frequency.
    pub(super) fn modulator_ratio(&self) -> f32 {
        match self {
            Self::Bass => 1.0,
            Self::Tom => 1.47,
            Self::Metal => 3.57,
        }
    }

    /// Mix weight of the voice in the drum mixer sum.
    pub(super) fn mix_gain(&self) -> f32 {
        match self {
            Self::Bass => 0.8,
            Self::Tom => 0.5,
            Self::Metal => 0.2,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Two operator FM drum voice with exponential pitch sweep.
///
/// A sine modulator phase-modulates a sine carrier. Three envelopes run from each trigger: a
/// slow one for the amplitude, a fast one for the pitch sweep and one in between for the
/// modulation index, so hits start bright and detuned and settle into the fundamental.
#[derive(Debug)]
pub struct FmDrum {
    sample_rate: u32,
    mode: FmDrumMode,
    carrier_phase: f32,
    modulator_phase: f32,
    amplitude_envelope: f32,
    pitch_envelope: f32,
    fm_envelope: f32,
}

impl FmDrum {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            mode: FmDrumMode::default(),
            carrier_phase: 0.0,
            modulator_phase: 0.0,
            amplitude_envelope: 0.0,
            pitch_envelope: 0.0,
            fm_envelope: 0.0,
        }
    }

    #[inline(always)]
    pub fn mode(&self) -> FmDrumMode {
        self.mode
    }
    pub fn set_mode(&mut self, mode: FmDrumMode) {
        self.mode = mode;
    }

    pub fn reset(&mut self) {
        self.carrier_phase = 0.0;
        self.modulator_phase = 0.0;
        self.amplitude_envelope = 0.0;
        self.pitch_envelope = 0.0;
        self.fm_envelope = 0.0;
    }

    /// Render one output sample. `f0` is the carrier fundamental normalized by the sample
    /// rate, `sweep` sets the depth of the downward pitch sweep.
    pub fn process(
        &mut self,
        trigger: bool,
        accent: f32,
        f0: f32,
        tone: f32,
        decay: f32,
        sweep: f32,
    ) -> f32 {
        let sample_rate = self.sample_rate as f32;

        let amplitude_decay = 1.0 - 0.002 * semitones_to_ratio(-decay * 60.0);
        let pitch_decay = 1.0 - 1.0 / (0.008 * sample_rate);
        let fm_decay = 1.0 - 0.005 * semitones_to_ratio(-decay * 36.0);

        if trigger {
            self.carrier_phase = 0.0;
            self.modulator_phase = 0.0;
            self.amplitude_envelope = 0.3 + 0.7 * accent;
            self.pitch_envelope = 1.0;
            self.fm_envelope = 1.0;
        }

        let frequency = f0 * (1.0 + sweep * 4.0 * self.pitch_envelope);
        let index = tone * 6.0 * self.fm_envelope;

        self.modulator_phase += (frequency * self.mode.modulator_ratio()).min(0.499);
        self.modulator_phase -= self.modulator_phase.floor();
        let modulator = (TAU * self.modulator_phase).sin();

        self.carrier_phase += frequency.min(0.499);
        self.carrier_phase -= self.carrier_phase.floor();
        let carrier = (TAU * self.carrier_phase + index * modulator).sin();

        let output = carrier * self.amplitude_envelope;
        self.amplitude_envelope *= amplitude_decay;
        self.pitch_envelope *= pitch_decay;
        self.fm_envelope *= fm_decay;

        output
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn render(drum: &mut FmDrum, tone: f32, sweep: f32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|frame| {
                drum.process(
                    frame == 0,
                    1.0,
                    80.0 / SAMPLE_RATE as f32,
                    tone,
                    0.5,
                    sweep,
                )
            })
            .collect()
    }

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count()
    }

    #[test]
    fn decays_to_silence() {
        let mut drum = FmDrum::new(SAMPLE_RATE);
        let output = render(&mut drum, 0.3, 0.5, SAMPLE_RATE as usize);

        let attack_peak = output[..4096]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        let tail_peak = output[output.len() - 4096..]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(attack_peak > 0.5);
        assert!(tail_peak < attack_peak * 0.05);
    }

    #[test]
    fn metal_mode_sounds_brighter_than_bass_mode() {
        let mut bass_drum = FmDrum::new(SAMPLE_RATE);
        bass_drum.set_mode(FmDrumMode::Bass);
        let bass = render(&mut bass_drum, 1.0, 0.0, 8192);

        let mut metal_drum = FmDrum::new(SAMPLE_RATE);
        metal_drum.set_mode(FmDrumMode::Metal);
        let metal = render(&mut metal_drum, 1.0, 0.0, 8192);

        assert!(zero_crossings(&metal) > zero_crossings(&bass));
    }

    #[test]
    fn sweep_raises_the_attack_pitch() {
        // with a sweep the first milliseconds run well above f0, so the attack window
        // crosses zero more often than the steady tail
        let mut drum = FmDrum::new(SAMPLE_RATE);
        let output = render(&mut drum, 0.0, 1.0, SAMPLE_RATE as usize / 2);

        let attack = zero_crossings(&output[..2048]);
        let tail = zero_crossings(&output[output.len() - 2048..]);
        assert!(attack > tail);
    }

    #[test]
    fn retrigger_restarts_the_envelope() {
        let mut drum = FmDrum::new(SAMPLE_RATE);
        let mut output = Vec::new();
        for frame in 0..SAMPLE_RATE as usize {
            let trigger = frame == 0 || frame == SAMPLE_RATE as usize / 2;
            output.push(drum.process(trigger, 1.0, 80.0 / SAMPLE_RATE as f32, 0.3, 0.5, 0.5));
        }

        let before_retrigger = output[SAMPLE_RATE as usize / 2 - 4096..SAMPLE_RATE as usize / 2]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        let after_retrigger = output[SAMPLE_RATE as usize / 2..SAMPLE_RATE as usize / 2 + 4096]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(after_retrigger > 4.0 * before_retrigger);
    }
}
