use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::utils::{
    dsp::{semitones_to_ratio, soft_clip},
    filter::{OnePoleFilter, SvfFilter},
};

// -------------------------------------------------------------------------------------------------

/// Number of resonator modes of the drum shell.
const NUM_MODES: usize = 5;

/// Mode frequencies relative to the fundamental. The first two are the classic 808 pair, the
/// remaining three extend the shell for brighter tones.
const MODE_FREQUENCIES: [f32; NUM_MODES] = [1.0, 2.0, 3.18, 4.16, 5.62];

// -------------------------------------------------------------------------------------------------

/// Snare drum model: a bank of five band-pass shell resonators excited by a clicky pulse, mixed
/// with an exponentially decaying noise burst for the snares.
///
/// Below `tone` ≈ 2/3 only the two 808 style modes sound, above that the extended modes fade
/// in. `snappy` balances the noise burst against the shell.
#[derive(Debug)]
pub struct AnalogSnareDrum {
    sample_rate: u32,
    pulse_remaining: usize,
    pulse: f32,
    pulse_height: f32,
    pulse_lp: OnePoleFilter,
    noise_envelope: f32,
    resonators: [SvfFilter; NUM_MODES],
    noise_filter: SvfFilter,
    rng: SmallRng,
}

impl AnalogSnareDrum {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            pulse_remaining: 0,
            pulse: 0.0,
            pulse_height: 0.0,
            pulse_lp: OnePoleFilter::new(),
            noise_envelope: 0.0,
            resonators: Default::default(),
            noise_filter: SvfFilter::default(),
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn reset(&mut self) {
        self.pulse_remaining = 0;
        self.pulse = 0.0;
        self.pulse_height = 0.0;
        self.pulse_lp.reset();
        self.noise_envelope = 0.0;
        for resonator in &mut self.resonators {
            resonator.reset();
        }
        self.noise_filter.reset();
    }

    /// Render one output sample. `f0` is the fundamental normalized by the sample rate,
    /// `snappy` balances the noise burst against the shell resonators.
    pub fn process(
        &mut self,
        trigger: bool,
        accent: f32,
        f0: f32,
        tone: f32,
        decay: f32,
        snappy: f32,
    ) -> f32 {
        let sample_rate = self.sample_rate as f32;
        let trigger_pulse_samples = (1.0e-3 * sample_rate) as usize;
        let pulse_decay_samples = 0.1e-3 * sample_rate;

        let f0 = f0.clamp(1e-5, 0.25);
        let q = 2000.0 * semitones_to_ratio(decay * 84.0);
        let noise_envelope_decay =
            1.0 - 0.0017 * semitones_to_ratio(-decay * (50.0 + snappy * 10.0));
        let snappy = (snappy * 1.1 - 0.05).clamp(0.0, 1.0);

        if trigger {
            self.pulse_remaining = trigger_pulse_samples;
            self.pulse_height = 3.0 + 7.0 * accent;
            self.noise_envelope = 2.0;
        }

        // shell mode gains: the 808 pair below tone 2/3, the extended bank above
        let mut gain = [0.0f32; NUM_MODES];
        if tone < 2.0 / 3.0 {
            let tone = tone * 1.5;
            gain[0] = 1.5 + (1.0 - tone) * (1.0 - tone) * 4.5;
            gain[1] = 2.0 * tone + 0.15;
        } else {
            let tone = (tone - 2.0 / 3.0) * 3.0;
            gain[0] = 1.5 - tone * 0.5;
            gain[1] = 2.15 - tone * 0.7;
            for mode_gain in gain.iter_mut().skip(2) {
                *mode_gain = 0.25 + tone * 1.5;
            }
        }

        let mut pulse;
        if self.pulse_remaining > 0 {
            self.pulse_remaining -= 1;
            pulse = if self.pulse_remaining > 0 {
                self.pulse_height
            } else {
                self.pulse_height - 1.0
            };
            self.pulse = pulse;
        } else {
            self.pulse *= 1.0 - 1.0 / pulse_decay_samples;
            pulse = self.pulse;
        }
        let pulse_lp = self.pulse_lp.process(pulse, 0.75);

        let mut shell = 0.0;
        for (mode, resonator) in self.resonators.iter_mut().enumerate() {
            let f = (f0 * MODE_FREQUENCIES[mode]).min(0.499);
            let mode_q = if mode == 0 { q } else { q * 0.25 };
            resonator.set_f_q(f, 1.0 + f * mode_q);
            let excitation = if mode == 0 {
                (pulse - pulse_lp) + 0.006 * pulse
            } else {
                0.026 * pulse
            };
            shell += gain[mode] * resonator.process_bandpass(excitation);
        }
        let shell = soft_clip(shell);

        // half-wave rectified noise burst through a band-pass, like the 808's snare buzz
        let mut noise = (2.0 * self.rng.random::<f32>() - 1.0).max(0.0);
        self.noise_envelope *= noise_envelope_decay;
        noise *= self.noise_envelope * snappy * 2.0;
        self.noise_filter
            .set_f_q((f0 * 16.0).min(0.499), 1.0 + f0 * 9.0);
        let noise = self.noise_filter.process_bandpass(noise);

        noise + shell * (1.0 - snappy)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn render(drum: &mut AnalogSnareDrum, snappy: f32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|frame| {
                drum.process(
                    frame == 0,
                    1.0,
                    200.0 / SAMPLE_RATE as f32,
                    0.5,
                    0.5,
                    snappy,
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
        let mut drum = AnalogSnareDrum::new(SAMPLE_RATE);
        let output = render(&mut drum, 0.5, SAMPLE_RATE as usize);

        let attack_peak = output[..4096]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        let tail_peak = output[output.len() - 4096..]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(attack_peak > 0.05);
        assert!(tail_peak < attack_peak * 0.05);
    }

    #[test]
    fn snappy_shifts_the_shell_noise_balance() {
        // full snappy is nearly all filtered noise, zero snappy nearly all shell modes,
        // so the noisy variant crosses zero far more often
        let mut shell_drum = AnalogSnareDrum::new(SAMPLE_RATE);
        let shell = render(&mut shell_drum, 0.0, 8192);

        let mut noise_drum = AnalogSnareDrum::new(SAMPLE_RATE);
        let noise = render(&mut noise_drum, 1.0, 8192);

        assert!(zero_crossings(&noise) > 2 * zero_crossings(&shell));
    }
}
