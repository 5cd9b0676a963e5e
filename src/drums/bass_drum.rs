use crate::utils::{
    dsp::semitones_to_ratio,
    filter::{OnePoleFilter, SvfFilter},
};

// -------------------------------------------------------------------------------------------------

/// Diode clipper of the bass drum's pulse shaper: passes positive signals unchanged and
/// saturates negative ones.
#[inline]
fn diode(sample: f32) -> f32 {
    if sample >= 0.0 {
        sample
    } else {
        let x = sample * 2.0;
        0.7 * x / (1.0 + x.abs())
    }
}

// -------------------------------------------------------------------------------------------------

/// Kick drum modeled after a self-oscillating bridged-T resonator circuit.
///
/// A short clicky exciter pulse and a longer retrigger FM pulse drive a high-Q band-pass
/// resonator whose low-pass state feeds back into its own frequency, which produces the
/// characteristic downward punch sweep. `tone` opens a one-pole output filter and controls how
/// much of the raw exciter click leaks into the output.
#[derive(Debug)]
pub struct AnalogBassDrum {
    sample_rate: u32,
    pulse_remaining: usize,
    fm_pulse_remaining: usize,
    pulse: f32,
    pulse_height: f32,
    pulse_lp: OnePoleFilter,
    fm_pulse_lp: OnePoleFilter,
    retrig_pulse: f32,
    resonator_lp: f32,
    tone_lp: OnePoleFilter,
    resonator: SvfFilter,
}

impl AnalogBassDrum {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            pulse_remaining: 0,
            fm_pulse_remaining: 0,
            pulse: 0.0,
            pulse_height: 0.0,
            pulse_lp: OnePoleFilter::new(),
            fm_pulse_lp: OnePoleFilter::new(),
            retrig_pulse: 0.0,
            resonator_lp: 0.0,
            tone_lp: OnePoleFilter::new(),
            resonator: SvfFilter::default(),
        }
    }

    pub fn reset(&mut self) {
        self.pulse_remaining = 0;
        self.fm_pulse_remaining = 0;
        self.pulse = 0.0;
        self.pulse_height = 0.0;
        self.pulse_lp.reset();
        self.fm_pulse_lp.reset();
        self.retrig_pulse = 0.0;
        self.resonator_lp = 0.0;
        self.tone_lp.reset();
        self.resonator.reset();
    }

    /// Render one output sample. `f0` is the fundamental normalized by the sample rate,
    /// `attack_sharpness` scales both the attack FM and the frequency self modulation depth.
    /// A `trigger` restarts the exciter pulses, without a trigger the resonator decays freely.
    pub fn process(
        &mut self,
        trigger: bool,
        accent: f32,
        f0: f32,
        tone: f32,
        decay: f32,
        attack_sharpness: f32,
    ) -> f32 {
        let sample_rate = self.sample_rate as f32;
        let trigger_pulse_samples = (1.0e-3 * sample_rate) as usize;
        let fm_pulse_samples = (6.0e-3 * sample_rate) as usize;
        let pulse_decay_samples = 0.2e-3 * sample_rate;
        let pulse_filter_coefficient = 1.0 / (0.1e-3 * sample_rate);
        let retrig_decay_samples = 0.05 * sample_rate;

        let f0 = f0.clamp(1e-5, 0.4);
        let scale = 0.001 / f0;
        let q = 1500.0 * semitones_to_ratio(decay * 80.0);
        let tone_f = (4.0 * f0 * semitones_to_ratio(tone * 108.0)).min(1.0);
        let exciter_leak = 0.08 * (tone + 0.25);

        if trigger {
            self.pulse_remaining = trigger_pulse_samples;
            self.fm_pulse_remaining = fm_pulse_samples;
            self.pulse_height = 3.0 + 7.0 * accent;
            self.resonator_lp = 0.0;
        }

        // exciter pulse with a rail drop on the final sample, then an RC style decay
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

        let pulse_lp = self.pulse_lp.process(pulse, pulse_filter_coefficient);
        pulse = diode((pulse - pulse_lp) + pulse * 0.044);

        // retrigger FM pulse with a negative overshoot when it ends
        let mut fm_pulse = 0.0;
        if self.fm_pulse_remaining > 0 {
            self.fm_pulse_remaining -= 1;
            fm_pulse = 1.0;
            self.retrig_pulse = if self.fm_pulse_remaining > 0 { 0.0 } else { -0.8 };
        } else {
            self.retrig_pulse *= 1.0 - 1.0 / retrig_decay_samples;
        }
        let fm_pulse_lp = self.fm_pulse_lp.process(fm_pulse, pulse_filter_coefficient);

        // frequency modulation from the attack pulse and from the resonator's own low-pass state
        let punch = 0.7 + diode(10.0 * self.resonator_lp - 1.0);
        let attack_fm = fm_pulse_lp * 1.7 * attack_sharpness;
        let self_fm = punch * 0.08 * self.resonator_lp * attack_sharpness;
        let f = (f0 * (1.0 + attack_fm + self_fm)).clamp(0.0, 0.4);

        self.resonator.set_f_q(f, 1.0 + q * f);
        let resonator = self
            .resonator
            .process((pulse - self.retrig_pulse * 0.2) * scale);
        self.resonator_lp = resonator.lowpass;

        let mix = -resonator.bandpass - exciter_leak * pulse;
        self.tone_lp.process(mix, tone_f)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn render(drum: &mut AnalogBassDrum, trigger_first: bool, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|frame| {
                let trigger = trigger_first && frame == 0;
                drum.process(trigger, 1.0, 55.0 / SAMPLE_RATE as f32, 0.5, 0.5, 0.5)
            })
            .collect()
    }

    #[test]
    fn decays_after_a_single_trigger() {
        let mut drum = AnalogBassDrum::new(SAMPLE_RATE);
        let output = render(&mut drum, true, SAMPLE_RATE as usize);

        assert!(output.iter().any(|sample| sample.abs() > 0.05));

        // windowed peaks decay monotonically towards silence
        let window = 4096;
        let peaks: Vec<f32> = output
            .chunks(window)
            .map(|chunk| chunk.iter().fold(0.0f32, |peak, s| peak.max(s.abs())))
            .collect();
        for pair in peaks.windows(2) {
            assert!(
                pair[1] <= pair[0] * 1.05,
                "Envelope rises from {} to {}",
                pair[0],
                pair[1]
            );
        }
        assert!(peaks[peaks.len() - 1] < peaks[0] * 0.05);
    }

    #[test]
    fn retrigger_restarts_the_envelope() {
        let mut drum = AnalogBassDrum::new(SAMPLE_RATE);
        let first = render(&mut drum, true, SAMPLE_RATE as usize / 2);
        let tail_peak = first[first.len() - 1024..]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));

        let second = render(&mut drum, true, 8192);
        let attack_peak = second.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(attack_peak > tail_peak * 4.0);
    }

    #[test]
    fn silent_without_any_trigger() {
        let mut drum = AnalogBassDrum::new(SAMPLE_RATE);
        let output = render(&mut drum, false, 4096);
        assert!(output.iter().all(|sample| sample.abs() < 1e-6));
    }
}
