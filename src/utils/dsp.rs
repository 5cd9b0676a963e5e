//! Common DSP math shared by the granular and drum units.

// -------------------------------------------------------------------------------------------------

/// Convert a pitch offset in semitones to a frequency or playback rate ratio.
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    (semitones * (1.0 / 12.0)).exp2()
}

// -------------------------------------------------------------------------------------------------

/// Cubic soft clipper with unity gain for small signals.
///
/// Input is clamped to [-3, 3], so the output smoothly saturates towards ±1 without ever folding
/// back. Used to tame resonator and feedback levels.
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    let x = sample.clamp(-3.0, 3.0);
    x * (27.0 + x * x) / (27.0 + 9.0 * x * x)
}

// -------------------------------------------------------------------------------------------------

/// Soft output limiter: transparent below an absolute value of 0.5, then saturates with a tanh
/// knee. The output magnitude always stays below 1.0 and the curve is continuous at the knee.
#[inline]
pub fn soft_limit(sample: f32) -> f32 {
    let magnitude = sample.abs();
    if magnitude < 0.5 {
        sample
    } else {
        let limited = 0.5 + 0.5 * (2.0 * (magnitude - 0.5)).tanh();
        limited.copysign(sample)
    }
}

// -------------------------------------------------------------------------------------------------

/// Hermite smoothstep `3t² - 2t³`, clamped to [0, 1]. Used for equal-gain crossfade envelopes.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semitone_ratios() {
        assert!((semitones_to_ratio(0.0) - 1.0).abs() < 1e-6);
        assert!((semitones_to_ratio(12.0) - 2.0).abs() < 1e-6);
        assert!((semitones_to_ratio(-12.0) - 0.5).abs() < 1e-6);
        assert!((semitones_to_ratio(7.0) - 1.4983071).abs() < 1e-4);
    }

    #[test]
    fn clipping() {
        // near linear for small signals
        assert!((soft_clip(0.01) - 0.01).abs() < 1e-4);
        assert!((soft_clip(-0.01) + 0.01).abs() < 1e-4);
        // saturates and never folds back, even for huge inputs
        assert!((soft_clip(3.0) - 1.0).abs() < 1e-6);
        assert!((soft_clip(1000.0) - 1.0).abs() < 1e-6);
        assert!((soft_clip(-1000.0) + 1.0).abs() < 1e-6);
        // odd symmetry
        for i in 0..100 {
            let x = i as f32 * 0.05;
            assert_eq!(soft_clip(x), -soft_clip(-x));
        }
    }

    #[test]
    fn limiting() {
        // transparent below the knee
        assert_eq!(soft_limit(0.25), 0.25);
        assert_eq!(soft_limit(-0.49), -0.49);
        // bounded below 1.0 for arbitrarily hot inputs, and continuous at the knee
        for i in 0..1000 {
            let x = (i as f32 - 500.0) * 0.02;
            assert!(soft_limit(x).abs() < 1.0);
        }
        assert!((soft_limit(0.5) - 0.5).abs() < 1e-6);
        assert!((soft_limit(0.500001) - 0.5).abs() < 1e-4);
        // monotonic
        let mut previous = -1.0;
        for i in 0..200 {
            let y = soft_limit((i as f32 - 100.0) * 0.1);
            assert!(y >= previous);
            previous = y;
        }
    }

    #[test]
    fn smoothsteps() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
        // S-shaped: slow near the edges
        assert!(smoothstep(0.1) < 0.1);
        assert!(smoothstep(0.9) > 0.9);
    }
}
