// -------------------------------------------------------------------------------------------------

/// One-pole low-pass smoother with an externally supplied coefficient.
///
/// Advances with `state += coefficient * (input - state)` per call. Used for exciter pulse
/// shaping in the drum voices and for slow control-rate fades like the freeze ramp.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnePoleFilter {
    state: f32,
}

impl OnePoleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the filter by one step and return the new state.
    #[inline]
    pub fn process(&mut self, input: f32, coefficient: f32) -> f32 {
        self.state += coefficient * (input - self.state);
        self.state
    }

    #[inline]
    pub fn state(&self) -> f32 {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::OnePoleFilter;

    #[test]
    fn convergence() {
        let mut filter = OnePoleFilter::new();
        for _ in 0..500 {
            let _ = filter.process(1.0, 0.05);
        }
        assert!((filter.state() - 1.0).abs() < 1e-5);

        filter.reset();
        assert_eq!(filter.state(), 0.0);

        // a unity coefficient tracks the input exactly
        assert_eq!(filter.process(0.75, 1.0), 0.75);
    }
}
