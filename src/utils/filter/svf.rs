use std::f32::consts::PI;

// -------------------------------------------------------------------------------------------------

/// All responses of the state-variable filter for a single input sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvfOutput {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

// -------------------------------------------------------------------------------------------------

/// Two-pole state-variable filter which computes low-pass, band-pass and high-pass responses
/// simultaneously, in the zero-delay feedback form.
///
/// Cutoff frequencies are normalized by the sample rate (`f = frequency_hz / sample_rate`), which
/// allows cheap per-sample coefficient updates in the drum voices.
#[derive(Debug, Default, Clone)]
pub struct SvfFilter {
    g: f32,
    r: f32,
    h: f32,
    state_1: f32,
    state_2: f32,
}

impl SvfFilter {
    /// Highest usable normalized cutoff frequency.
    pub const MAX_FREQUENCY: f32 = 0.497;

    pub fn new(f: f32, q: f32) -> Self {
        let mut filter = Self::default();
        filter.set_f_q(f, q);
        filter
    }

    /// Update coefficients for the normalized cutoff frequency `f` and resonance `q`.
    /// `f` is clamped to (0, [`Self::MAX_FREQUENCY`]] and `q` to a minimum of 0.5.
    pub fn set_f_q(&mut self, f: f32, q: f32) {
        let f = f.clamp(1e-5, Self::MAX_FREQUENCY);
        let q = q.max(0.5);
        let g = (PI * f).tan();
        self.g = g;
        self.r = 1.0 / q;
        self.h = 1.0 / (1.0 + self.r * g + g * g);
    }

    /// Clear the filter state, keeping the coefficients.
    pub fn reset(&mut self) {
        self.state_1 = 0.0;
        self.state_2 = 0.0;
    }

    /// Process a single sample and return all filter responses.
    #[inline]
    pub fn process(&mut self, input: f32) -> SvfOutput {
        let highpass =
            (input - self.r * self.state_1 - self.g * self.state_1 - self.state_2) * self.h;
        let bandpass = self.g * highpass + self.state_1;
        self.state_1 = self.g * highpass + bandpass;
        let lowpass = self.g * bandpass + self.state_2;
        self.state_2 = self.g * bandpass + lowpass;
        SvfOutput {
            lowpass,
            bandpass,
            highpass,
        }
    }

    #[inline]
    pub fn process_lowpass(&mut self, input: f32) -> f32 {
        self.process(input).lowpass
    }

    #[inline]
    pub fn process_bandpass(&mut self, input: f32) -> f32 {
        self.process(input).bandpass
    }

    #[inline]
    pub fn process_highpass(&mut self, input: f32) -> f32 {
        self.process(input).highpass
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_response() {
        let mut filter = SvfFilter::new(0.1, 0.7);
        // settle on a DC input: all of it passes the low-pass, none the high-pass
        let mut output = SvfOutput {
            lowpass: 0.0,
            bandpass: 0.0,
            highpass: 0.0,
        };
        for _ in 0..2000 {
            output = filter.process(1.0);
        }
        assert!((output.lowpass - 1.0).abs() < 1e-3);
        assert!(output.highpass.abs() < 1e-3);
        assert!(output.bandpass.abs() < 1e-3);
    }

    #[test]
    fn stability_at_extremes() {
        // coefficients clamp to a usable range even for silly inputs
        let mut filter = SvfFilter::new(10.0, 0.0);
        for i in 0..10000 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            let output = filter.process(input);
            assert!(output.lowpass.is_finite());
            assert!(output.highpass.is_finite());
        }
    }

    #[test]
    fn reset_clears_state() {
        let mut filter = SvfFilter::new(0.05, 2.0);
        for _ in 0..100 {
            let _ = filter.process(1.0);
        }
        filter.reset();
        let output = filter.process(0.0);
        assert_eq!(output.lowpass, 0.0);
        assert_eq!(output.bandpass, 0.0);
        assert_eq!(output.highpass, 0.0);
    }
}
