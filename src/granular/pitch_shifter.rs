use super::buffer::AudioBuffer;
use crate::utils::dsp::semitones_to_ratio;

// -------------------------------------------------------------------------------------------------

/// Tap window bounds in samples, mapped from the size parameter.
const MIN_WINDOW: f32 = 128.0;
const MAX_WINDOW: f32 = 2048.0;

/// Pitch offsets closer to unity than this fade back to the dry signal, which avoids the
/// combing of a doppler shifter running at a ratio of almost exactly 1.
const DEAD_ZONE_SEMITONES: f32 = 0.7;

// -------------------------------------------------------------------------------------------------

/// A doppler pitch shifter with two crossfaded read taps half a window apart.
///
/// The tap phase advances with `(1 - ratio) / window` per frame, so material gets resampled on
/// the fly without changing its duration. Both channels share one tap phase to keep the stereo
/// image intact.
#[derive(Debug)]
pub(crate) struct PitchShifter {
    rings: [AudioBuffer; 2],
    phase: f32,
    window: f32,
}

impl PitchShifter {
    const RING_CAPACITY: usize = 4096;

    pub fn new() -> Self {
        Self {
            rings: [
                AudioBuffer::new(Self::RING_CAPACITY),
                AudioBuffer::new(Self::RING_CAPACITY),
            ],
            phase: 0.0,
            window: MAX_WINDOW * 0.5,
        }
    }

    pub fn reset(&mut self) {
        for ring in &mut self.rings {
            ring.clear();
        }
        self.phase = 0.0;
    }

    /// Shift both channels in place by `semitones`, with the tap window selected by the
    /// normalized `size`. Offsets within the dead zone around unity blend back to dry.
    pub fn process(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        semitones: f32,
        size: f32,
    ) {
        debug_assert_eq!(left.len(), right.len());

        let ratio = semitones_to_ratio(semitones);
        let wet_amount =
            ((semitones.abs() - 0.1) / (DEAD_ZONE_SEMITONES - 0.1)).clamp(0.0, 1.0);

        // ease the window towards its target to avoid tap jumps when size changes
        let window_target = MIN_WINDOW + size.clamp(0.0, 1.0) * (MAX_WINDOW - MIN_WINDOW);
        self.window += 0.05 * (window_target - self.window);
        let window = self.window;

        let phase_increment = (1.0 - ratio) / window;

        for frame in 0..left.len() {
            self.phase += phase_increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            } else if self.phase < 0.0 {
                self.phase += 1.0;
            }

            let tap_1 = self.phase * window;
            let mut tap_2 = tap_1 + 0.5 * window;
            if tap_2 >= window {
                tap_2 -= window;
            }
            let crossfade = 2.0 * self.phase.min(1.0 - self.phase);

            let dry = [left[frame], right[frame]];
            for (channel, ring) in self.rings.iter_mut().enumerate() {
                ring.write(&[dry[channel]], false);
                let newest = ring.write_position() as f64 - 1.0;
                let shifted = ring.read_interpolated(newest - tap_1 as f64) * crossfade
                    + ring.read_interpolated(newest - tap_2 as f64) * (1.0 - crossfade);
                let output = dry[channel] + wet_amount * (shifted - dry[channel]);
                if channel == 0 {
                    left[frame] = output;
                } else {
                    right[frame] = output;
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_is_transparent() {
        let mut shifter = PitchShifter::new();
        let mut left = (0..512)
            .map(|i| (i as f32 * 0.05).sin())
            .collect::<Vec<_>>();
        let mut right = left.clone();
        let original = left.clone();

        // inside the dead zone the dry signal passes through untouched
        shifter.process(&mut left, &mut right, 0.0, 0.5);
        assert_eq!(left, original);
        assert_eq!(right, original);
    }

    #[test]
    fn octave_up_doubles_frequency() {
        const SAMPLE_RATE: f32 = 44100.0;
        const FREQUENCY: f32 = 220.0;

        let mut shifter = PitchShifter::new();
        let mut phase = 0.0f32;
        let mut rendered = Vec::new();

        // stream 0.7 seconds of a sine through the shifter at +12 semitones
        let mut left = vec![0.0; 512];
        let mut right = vec![0.0; 512];
        while rendered.len() < (0.7 * SAMPLE_RATE) as usize {
            for sample in left.iter_mut() {
                *sample = (phase * std::f32::consts::TAU).sin();
                phase = (phase + FREQUENCY / SAMPLE_RATE).fract();
            }
            right.copy_from_slice(&left);
            shifter.process(&mut left, &mut right, 12.0, 0.5);
            rendered.extend_from_slice(&left);
        }

        // count zero crossings in the steady state region
        let warmup = (0.2 * SAMPLE_RATE) as usize;
        let analysis = &rendered[warmup..];
        let crossings = analysis
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();
        let seconds = analysis.len() as f32 / SAMPLE_RATE;
        let measured_frequency = crossings as f32 / (2.0 * seconds);
        assert!(
            (measured_frequency - 2.0 * FREQUENCY).abs() < 2.0 * FREQUENCY * 0.15,
            "Measured {measured_frequency} Hz instead of {} Hz",
            2.0 * FREQUENCY
        );
    }
}
