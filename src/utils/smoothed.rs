use std::fmt::Debug;

// -------------------------------------------------------------------------------------------------

/// A control value that glides towards its target instead of jumping, so parameter changes
/// don't produce zipper noise in the audio path.
///
/// Implementations are advanced once per audio frame via [`Self::next`]. While no ramp is in
/// flight `is_ramping` returns false, and callers may apply the target value in whole blocks
/// instead of per frame.
pub trait SmoothedValue: Debug {
    /// The momentary value, without advancing the ramp.
    #[must_use]
    fn current(&self) -> f32;
    /// The value the ramp is heading towards.
    #[must_use]
    fn target(&self) -> f32;
    /// True while `current` still differs from `target`.
    #[must_use]
    fn is_ramping(&self) -> bool;

    /// Advance the ramp by one frame and return the new momentary value.
    fn next(&mut self) -> f32;

    /// Jump to the given value without ramping.
    fn init(&mut self, value: f32);
    /// Start gliding towards the given target.
    fn set_target(&mut self, target: f32);

    /// Rescale ramp speeds so they stay constant in wall-clock time.
    fn set_sample_rate(&mut self, sample_rate: u32);
}

// -------------------------------------------------------------------------------------------------

/// One-pole smoothing: every frame the value moves a fixed fraction of the remaining distance
/// towards the target, giving fast initial movement and a soft landing. The default choice for
/// level and timbre controls.
#[derive(Debug, Clone)]
pub struct ExponentialSmoothedValue {
    current: f32,
    target: f32,
    inertia: f32,
    coefficient: f32,
}

impl ExponentialSmoothedValue {
    /// Default per-frame approach factor, expressed at the reference rate of 44.1 kHz.
    pub const DEFAULT_INERTIA: f32 = 0.02;

    /// Ramps snap to the target when the remaining distance falls below this threshold.
    const SETTLE_THRESHOLD: f32 = 1e-5;

    pub fn new(value: f32, sample_rate: u32) -> Self {
        Self::with_inertia(value, Self::DEFAULT_INERTIA, sample_rate)
    }

    pub fn with_inertia(value: f32, inertia: f32, sample_rate: u32) -> Self {
        assert!(
            inertia > 0.0 && inertia <= 1.0,
            "Smoothing inertia out of range"
        );
        let mut smoother = Self {
            current: value,
            target: value,
            inertia,
            coefficient: 0.0,
        };
        smoother.set_sample_rate(sample_rate);
        smoother
    }

    /// The configured approach factor at the reference rate of 44.1 kHz.
    pub fn inertia(&self) -> f32 {
        self.inertia
    }
}

impl SmoothedValue for ExponentialSmoothedValue {
    #[inline]
    fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    fn is_ramping(&self) -> bool {
        self.current != self.target
    }

    #[inline]
    fn next(&mut self) -> f32 {
        if self.current != self.target {
            self.current += (self.target - self.current) * self.coefficient;
            if (self.target - self.current).abs() <= Self::SETTLE_THRESHOLD {
                self.current = self.target;
            }
        }
        self.current
    }

    fn init(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    fn set_target(&mut self, target: f32) {
        self.target = target;
        if (self.target - self.current).abs() <= Self::SETTLE_THRESHOLD {
            self.current = self.target;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        assert!(sample_rate > 0, "Invalid sample rate");
        // keep the settling time constant in seconds when running at other rates than 44.1 kHz
        let frame_ratio = 44100.0 / sample_rate as f64;
        self.coefficient = (1.0 - (1.0 - self.inertia as f64).powf(frame_ratio)) as f32;
    }
}

// -------------------------------------------------------------------------------------------------

/// Constant-slope smoothing that reaches its target after an exact number of frames. Used where
/// the ramp duration matters more than its shape, e.g. for delay time changes.
#[derive(Debug, Clone)]
pub struct LinearSmoothedValue {
    current: f32,
    target: f32,
    slope: f32,
    frames_left: u32,
    default_ramp_frames: u32,
}

impl LinearSmoothedValue {
    /// Ramp duration used by [`SmoothedValue::set_target`] when no explicit frame count is given.
    pub const DEFAULT_RAMP_SECONDS: f32 = 0.005;

    pub fn new(value: f32, sample_rate: u32) -> Self {
        let mut smoother = Self {
            current: value,
            target: value,
            slope: 0.0,
            frames_left: 0,
            default_ramp_frames: 0,
        };
        smoother.set_sample_rate(sample_rate);
        smoother
    }

    /// Start a ramp that arrives at `target` after exactly `frames` frames. A frame count of
    /// zero jumps without ramping.
    pub fn set_target_in(&mut self, target: f32, frames: u32) {
        self.target = target;
        if frames == 0 || self.current == target {
            self.current = target;
            self.frames_left = 0;
        } else {
            self.slope = (target - self.current) / frames as f32;
            self.frames_left = frames;
        }
    }
}

impl SmoothedValue for LinearSmoothedValue {
    #[inline]
    fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    fn is_ramping(&self) -> bool {
        self.frames_left > 0
    }

    #[inline]
    fn next(&mut self) -> f32 {
        if self.frames_left > 0 {
            self.frames_left -= 1;
            if self.frames_left == 0 {
                self.current = self.target;
            } else {
                self.current += self.slope;
            }
        }
        self.current
    }

    fn init(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.frames_left = 0;
    }

    fn set_target(&mut self, target: f32) {
        self.set_target_in(target, self.default_ramp_frames);
    }

    fn set_sample_rate(&mut self, sample_rate: u32) {
        assert!(sample_rate > 0, "Invalid sample rate");
        self.default_ramp_frames = (Self::DEFAULT_RAMP_SECONDS * sample_rate as f32) as u32;
        // a running ramp keeps its remaining frame count, so only the slope is rescaled
        if self.frames_left > 0 {
            self.slope = (self.target - self.current) / self.frames_left as f32;
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_converges() {
        let mut value = ExponentialSmoothedValue::new(0.0, 44100);
        assert!(!value.is_ramping());
        assert_eq!(value.next(), 0.0);

        value.set_target(1.0);
        assert!(value.is_ramping());

        // approaches the target monotonically, then settles exactly on it
        let mut previous = value.current();
        for _ in 0..4096 {
            let next = value.next();
            assert!(next >= previous && next <= 1.0);
            previous = next;
        }
        assert_eq!(value.current(), 1.0);
        assert!(!value.is_ramping());

        value.init(0.25);
        assert!(!value.is_ramping());
        assert_eq!(value.current(), 0.25);
    }

    #[test]
    fn exponential_rate_compensation() {
        // the same wall-clock time must cover the same distance at any sample rate
        let mut at_44k = ExponentialSmoothedValue::new(0.0, 44100);
        let mut at_88k = ExponentialSmoothedValue::new(0.0, 88200);
        at_44k.set_target(1.0);
        at_88k.set_target(1.0);
        for _ in 0..441 {
            at_44k.next();
        }
        for _ in 0..882 {
            at_88k.next();
        }
        assert!((at_44k.current() - at_88k.current()).abs() < 1e-3);
    }

    #[test]
    fn linear_hits_target_exactly() {
        let mut value = LinearSmoothedValue::new(0.0, 44100);
        value.set_target_in(1.0, 64);
        for step in 0..64 {
            assert!(value.is_ramping(), "ramp ended early at step {step}");
            value.next();
        }
        assert!(!value.is_ramping());
        assert_eq!(value.current(), 1.0);

        // without an explicit frame count the default ramp duration applies
        value.set_target(0.0);
        let expected = (LinearSmoothedValue::DEFAULT_RAMP_SECONDS * 44100.0) as u32;
        let mut frames = 0;
        while value.is_ramping() {
            value.next();
            frames += 1;
        }
        assert_eq!(frames, expected);
        assert_eq!(value.current(), 0.0);
    }

    #[test]
    fn linear_retarget_mid_ramp() {
        let mut value = LinearSmoothedValue::new(0.0, 44100);
        value.set_target_in(1.0, 100);
        for _ in 0..50 {
            value.next();
        }
        // a new target restarts the ramp from the momentary value
        value.set_target_in(-1.0, 10);
        for _ in 0..10 {
            value.next();
        }
        assert_eq!(value.current(), -1.0);
    }
}
