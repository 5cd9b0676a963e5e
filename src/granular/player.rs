use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::{
    buffer::AudioBuffer,
    grain::{Grain, GRAIN_WINDOW},
    parameters::GranularParameters,
};
use crate::utils::dsp::semitones_to_ratio;

// -------------------------------------------------------------------------------------------------

/// Maximum number of simultaneously playing grains. Trigger requests which find no idle grain
/// are dropped silently.
const MAX_GRAINS: usize = 32;

/// Grain duration bounds in samples and seconds.
const MIN_GRAIN_DURATION: usize = 64;
const MAX_GRAIN_SECONDS: f32 = 1.0;

/// Grain spawn rate bounds in Hz, mapped from the density parameter.
const MIN_SPAWN_RATE: f32 = 0.5;
const MAX_SPAWN_RATE: f32 = 64.0;

/// Playback rate bounds for pitched grains.
const MIN_PLAYBACK_RATIO: f32 = 0.0625;
const MAX_PLAYBACK_RATIO: f32 = 8.0;

// -------------------------------------------------------------------------------------------------

/// Renders a polyphonic cloud of short, windowed grains read from the shared audio buffers.
///
/// Grains spawn from a deterministic trigger phase accumulator which advances with the density
/// parameter, so spawn times are sample exact and independent of the host's block size. The
/// texture parameter adds spawn position jitter and occasional reversed grains on top.
#[derive(Debug)]
pub(crate) struct GranularPlayer {
    grains: Vec<Grain>,
    trigger_phase: f64,
    pitch_offset: f32,
    sample_rate: u32,
    rng: SmallRng,
}

impl GranularPlayer {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_pitch_offset(sample_rate, 0.0)
    }

    /// Create a player which transposes all grains by the given offset in semitones.
    pub fn with_pitch_offset(sample_rate: u32, pitch_offset: f32) -> Self {
        Self {
            grains: vec![Grain::new(); MAX_GRAINS],
            trigger_phase: 0.0,
            pitch_offset,
            sample_rate,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Stop all grains and restart the trigger phase.
    pub fn reset(&mut self) {
        for grain in &mut self.grains {
            grain.deactivate();
        }
        self.trigger_phase = 0.0;
    }

    #[cfg(test)]
    pub fn active_grain_count(&self) -> usize {
        self.grains.iter().filter(|g| g.is_active()).count()
    }

    /// Render one block of the grain cloud into the given output slices, overwriting them.
    /// With a single source buffer both outputs carry the same panned mono cloud.
    pub fn process(
        &mut self,
        buffers: &[AudioBuffer],
        parameters: &GranularParameters,
        output_left: &mut [f32],
        output_right: &mut [f32],
    ) {
        debug_assert!(!buffers.is_empty(), "Missing source buffers");
        debug_assert_eq!(output_left.len(), output_right.len());

        let window = &*GRAIN_WINDOW;
        let stereo = buffers.len() >= 2;
        let spawn_rate = Self::spawn_rate(parameters.density);
        let trigger_increment = spawn_rate as f64 / self.sample_rate as f64;

        for frame in 0..output_left.len() {
            self.trigger_phase += trigger_increment;
            if self.trigger_phase >= 1.0 {
                self.trigger_phase -= 1.0;
                self.activate_grain(buffers, parameters);
            }

            let mut left = 0.0;
            let mut right = 0.0;
            for grain in self.grains.iter_mut().filter(|grain| grain.is_active()) {
                let grain_frame = grain.process(window);
                let sample_left = buffers[0].read_interpolated(grain_frame.position);
                let sample_right = if stereo {
                    buffers[1].read_interpolated(grain_frame.position)
                } else {
                    sample_left
                };
                left += sample_left * grain_frame.envelope * grain.pan_left();
                right += sample_right * grain_frame.envelope * grain.pan_right();
            }
            output_left[frame] = left;
            output_right[frame] = right;
        }
    }

    /// Grain spawn rate in Hz for a normalized density.
    fn spawn_rate(density: f32) -> f32 {
        let density = density.clamp(0.0, 1.0);
        MIN_SPAWN_RATE + density * density * (MAX_SPAWN_RATE - MIN_SPAWN_RATE)
    }

    /// Start a new grain with the current parameters, if an idle grain slot is available.
    fn activate_grain(&mut self, buffers: &[AudioBuffer], parameters: &GranularParameters) {
        let Some(grain) = self.grains.iter_mut().find(|grain| !grain.is_active()) else {
            return; // all grains busy
        };

        let duration_seconds =
            0.015 * (parameters.size.clamp(0.0, 1.0) * 6.0).exp2().min(64.0);
        let max_duration = (MAX_GRAIN_SECONDS * self.sample_rate as f32) as usize;
        let duration = ((duration_seconds * self.sample_rate as f32) as usize)
            .clamp(MIN_GRAIN_DURATION, max_duration);

        let ratio = semitones_to_ratio(parameters.pitch + self.pitch_offset)
            .clamp(MIN_PLAYBACK_RATIO, MAX_PLAYBACK_RATIO);

        // texture below the diffusion range controls spawn jitter and reverse probability
        let jitter_amount = (parameters.texture.clamp(0.0, 1.0) / 0.75).min(1.0);
        let reversed = self.rng.random::<f32>() < 0.25 * jitter_amount;
        let increment = if reversed { -ratio as f64 } else { ratio as f64 };

        let capacity = buffers[0].capacity() as f64;
        let max_delay = capacity * 0.75;
        let jitter =
            (self.rng.random::<f64>() - 0.5) * jitter_amount as f64 * 0.5 * max_delay;
        let delay = (parameters.position.clamp(0.0, 1.0) as f64 * max_delay + jitter)
            .clamp(2.0, capacity - 2.0);
        let position = buffers[0].write_position() as f64 - delay;

        let overlap = Self::spawn_rate(parameters.density) * duration_seconds;
        let amplitude = 1.0 / (1.0 + overlap).sqrt();
        let pan = self.rng.random::<f32>() - 0.5;

        grain.activate(position, increment, duration, amplitude, pan);
    }
}

// -------------------------------------------------------------------------------------------------

/// A granular cloud which regenerates the buffer one octave up, for shimmer style washes.
///
/// Uses longer grains and a denser spawn rate than the plain granular player, so the transposed
/// copies smear into a pad instead of discrete echoes.
#[derive(Debug)]
pub(crate) struct ShimmerPlayer {
    player: GranularPlayer,
}

impl ShimmerPlayer {
    const PITCH_OFFSET: f32 = 12.0;

    pub fn new(sample_rate: u32) -> Self {
        Self {
            player: GranularPlayer::with_pitch_offset(sample_rate, Self::PITCH_OFFSET),
        }
    }

    pub fn reset(&mut self) {
        self.player.reset();
    }

    pub fn process(
        &mut self,
        buffers: &[AudioBuffer],
        parameters: &GranularParameters,
        output_left: &mut [f32],
        output_right: &mut [f32],
    ) {
        let mut shimmer = *parameters;
        shimmer.size = 0.5 + parameters.size * 0.5;
        shimmer.density = 0.5 + parameters.density * 0.5;
        self.player
            .process(buffers, &shimmer, output_left, output_right);
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_buffer(sample_rate: u32) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(sample_rate as usize);
        let samples = (0..buffer.capacity())
            .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / sample_rate as f32).sin())
            .collect::<Vec<_>>();
        buffer.write(&samples, false);
        buffer
    }

    #[test]
    fn deterministic_trigger_timing() {
        const SAMPLE_RATE: u32 = 44100;
        let buffers = vec![sine_buffer(SAMPLE_RATE)];
        let mut player = GranularPlayer::new(SAMPLE_RATE);

        // at zero density grains spawn at 0.5 Hz: the first one exactly after two seconds
        let parameters = GranularParameters {
            density: 0.0,
            texture: 0.0,
            ..GranularParameters::default()
        };

        let mut left = vec![0.0; 1024];
        let mut right = vec![0.0; 1024];
        let mut frames_until_first_grain = 0;
        while player.active_grain_count() == 0 {
            player.process(&buffers, &parameters, &mut left, &mut right);
            frames_until_first_grain += left.len();
            assert!(frames_until_first_grain < 3 * SAMPLE_RATE as usize);
        }
        let expected = 2 * SAMPLE_RATE as usize;
        assert!(frames_until_first_grain + 1024 >= expected);
        assert!(frames_until_first_grain <= expected + 1024);
    }

    #[test]
    fn grain_pool_never_overflows() {
        const SAMPLE_RATE: u32 = 44100;
        let buffers = vec![sine_buffer(SAMPLE_RATE), sine_buffer(SAMPLE_RATE)];
        let mut player = GranularPlayer::new(SAMPLE_RATE);

        // max density and size: spawn requests far exceed the pool capacity
        let parameters = GranularParameters {
            density: 1.0,
            size: 1.0,
            texture: 1.0,
            ..GranularParameters::default()
        };

        let mut left = vec![0.0; 512];
        let mut right = vec![0.0; 512];
        for _ in 0..200 {
            player.process(&buffers, &parameters, &mut left, &mut right);
            assert!(player.active_grain_count() <= MAX_GRAINS);
            for sample in left.iter().chain(right.iter()) {
                assert!(sample.is_finite());
            }
        }
        assert!(player.active_grain_count() > 0);

        // dense clouds keep their overall level in check via the overlap compensation
        let peak = left
            .iter()
            .chain(right.iter())
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(peak < 8.0);
    }

    #[test]
    fn reset_stops_all_grains() {
        const SAMPLE_RATE: u32 = 44100;
        let buffers = vec![sine_buffer(SAMPLE_RATE)];
        let mut player = GranularPlayer::new(SAMPLE_RATE);
        let parameters = GranularParameters {
            density: 1.0,
            ..GranularParameters::default()
        };

        let mut left = vec![0.0; 4096];
        let mut right = vec![0.0; 4096];
        player.process(&buffers, &parameters, &mut left, &mut right);
        assert!(player.active_grain_count() > 0);

        player.reset();
        assert_eq!(player.active_grain_count(), 0);
    }
}
