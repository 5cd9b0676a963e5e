use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::utils::{dsp::semitones_to_ratio, filter::SvfFilter};

// -------------------------------------------------------------------------------------------------

/// Frequency ratios of the six square oscillators, tuned close to the 808 cymbal stack.
const SQUARE_RATIOS: [f32; 6] = [1.0, 1.304, 1.466, 1.787, 1.932, 2.536];

/// Bank of six detuned square oscillators summed into a metallic noise source.
#[derive(Debug, Default)]
struct SquareNoise {
    phases: [u32; 6],
}

impl SquareNoise {
    fn process(&mut self, f0: f32) -> f32 {
        let mut sum = 0;
        for (phase, ratio) in self.phases.iter_mut().zip(SQUARE_RATIOS) {
            let increment = ((f0 * ratio).min(0.499) * 4294967296.0) as u32;
            *phase = phase.wrapping_add(increment);
            sum += *phase >> 31;
        }
        sum as f32 * 0.33 - 1.0
    }

    fn reset(&mut self) {
        self.phases = [0; 6];
    }
}

// -------------------------------------------------------------------------------------------------

/// Hi-hat model: six square oscillators blended with clocked noise, shaped by a two stage
/// envelope and a band-pass, then cleaned up with a high-pass at the fundamental.
///
/// `noisiness` morphs the source from purely metallic squares to sampled noise, `tone` moves
/// the band-pass up to open the sound.
#[derive(Debug)]
pub struct MetallicHiHat {
    sample_rate: u32,
    square_noise: SquareNoise,
    noise_clock: f32,
    noise_sample: f32,
    envelope: f32,
    bandpass: SvfFilter,
    highpass: SvfFilter,
    rng: SmallRng,
}

impl MetallicHiHat {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            square_noise: SquareNoise::default(),
            noise_clock: 0.0,
            noise_sample: 0.0,
            envelope: 0.0,
            bandpass: SvfFilter::default(),
            highpass: SvfFilter::default(),
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn reset(&mut self) {
        self.square_noise.reset();
        self.noise_clock = 0.0;
        self.noise_sample = 0.0;
        self.envelope = 0.0;
        self.bandpass.reset();
        self.highpass.reset();
    }

    /// Render one output sample. `f0` is the fundamental normalized by the sample rate,
    /// `noisiness` blends from metallic squares towards clocked noise.
    pub fn process(
        &mut self,
        trigger: bool,
        accent: f32,
        f0: f32,
        tone: f32,
        decay: f32,
        noisiness: f32,
    ) -> f32 {
        let sample_rate = self.sample_rate as f32;

        let envelope_decay = 1.0 - 0.003 * semitones_to_ratio(-decay * 84.0);
        let cut_decay = 1.0 - 0.0025 * semitones_to_ratio(-decay * 36.0);

        if trigger {
            self.envelope = (1.5 + 0.5 * (1.0 - decay)) * (0.3 + 0.7 * accent);
        }

        // metallic source, the oscillator stack sits an octave above the fundamental
        let metallic = self.square_noise.process(2.0 * f0);

        // blend towards sample and hold noise clocked well above the fundamental
        let noisiness = noisiness * noisiness;
        self.noise_clock += f0 * (16.0 + 16.0 * (1.0 - noisiness));
        if self.noise_clock >= 1.0 {
            self.noise_clock -= 1.0;
            self.noise_sample = self.rng.random::<f32>() - 0.5;
        }
        let source = metallic + noisiness * (self.noise_sample - metallic);

        let cutoff = ((150.0 / sample_rate) * semitones_to_ratio(tone * 72.0))
            .min(16000.0 / sample_rate);
        self.bandpass.set_f_q(cutoff, 3.0 + 3.0 * tone);
        let filtered = self.bandpass.process_bandpass(source);

        // open stage while the envelope is hot, then a faster choke below the knee
        let output = filtered * self.envelope;
        self.envelope *= if self.envelope > 0.5 {
            envelope_decay
        } else {
            cut_decay
        };

        self.highpass.set_f_q(f0, 0.5);
        self.highpass.process_highpass(output)
    }
}

// -------------------------------------------------------------------------------------------------
