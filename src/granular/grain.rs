use std::sync::LazyLock;

use assume::assume;

// -------------------------------------------------------------------------------------------------

/// Shared Hann window lookup table for grain envelopes.
pub(crate) static GRAIN_WINDOW: LazyLock<GrainWindow<2048>> = LazyLock::new(GrainWindow::new);

// -------------------------------------------------------------------------------------------------

/// Precomputed Hann window `0.5 * (1 - cos(2πt))` with linear interpolation between entries.
///
/// The table holds `N + 1` entries, so interpolated lookups reach exactly zero at both window
/// edges and grains never click in or out.
#[derive(Debug, Clone)]
pub(crate) struct GrainWindow<const N: usize> {
    table: Vec<f32>,
}

impl<const N: usize> GrainWindow<N> {
    const _VERIFY_N: () = assert!(N.is_power_of_two(), "Window size must be a power of two");

    pub fn new() -> Self {
        let _ = Self::_VERIFY_N;
        let table = (0..=N)
            .map(|i| {
                let t = i as f32 / N as f32;
                0.5 * (1.0 - (t * std::f32::consts::TAU).cos())
            })
            .collect();
        Self { table }
    }

    /// Sample the window at a normalized phase in range [0, 1].
    #[inline]
    pub fn sample(&self, phase: f32) -> f32 {
        assume!(unsafe: self.table.len() == N + 1, "table holds N + 1 entries");
        let position = phase.clamp(0.0, 1.0) * N as f32;
        let index = (position as usize).min(N - 1);
        let fraction = position - index as f32;
        self.table[index] + (self.table[index + 1] - self.table[index]) * fraction
    }
}

// -------------------------------------------------------------------------------------------------

/// A single grain's per-frame output, to be scaled by the grain's pan gains.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrainFrame {
    /// Absolute fractional read position in the source buffer.
    pub position: f64,
    /// Window envelope including the grain's amplitude.
    pub envelope: f32,
}

// -------------------------------------------------------------------------------------------------

/// A single grain voice: a windowed, pitched read tap into the shared audio buffer.
///
/// Grains move through three states: idle, then active after [`Self::activate`], then idle
/// again once the window completed. A retriggered grain simply restarts with new settings.
#[derive(Debug, Clone)]
pub(crate) struct Grain {
    active: bool,
    position: f64,
    increment: f64,
    window_phase: f32,
    window_increment: f32,
    samples_remaining: usize,
    amplitude: f32,
    pan_left: f32,
    pan_right: f32,
}

impl Grain {
    pub const fn new() -> Self {
        Self {
            active: false,
            position: 0.0,
            increment: 0.0,
            window_phase: 0.0,
            window_increment: 0.0,
            samples_remaining: 0,
            amplitude: 0.0,
            pan_left: 0.5,
            pan_right: 0.5,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn pan_left(&self) -> f32 {
        self.pan_left
    }

    #[inline]
    pub fn pan_right(&self) -> f32 {
        self.pan_right
    }

    /// (Re)start the grain at the given buffer position.
    ///
    /// `increment` is the playback ratio per frame and may be negative for reversed grains.
    /// `pan` is the stereo position in range [-1, 1].
    pub fn activate(
        &mut self,
        position: f64,
        increment: f64,
        duration: usize,
        amplitude: f32,
        pan: f32,
    ) {
        debug_assert!(duration > 0, "Grain duration must not be empty");
        self.active = true;
        self.position = position;
        self.increment = increment;
        self.window_phase = 0.0;
        self.window_increment = 1.0 / duration as f32;
        self.samples_remaining = duration;
        self.amplitude = amplitude;
        self.pan_left = (1.0 - pan.clamp(-1.0, 1.0)) * 0.5;
        self.pan_right = (1.0 + pan.clamp(-1.0, 1.0)) * 0.5;
    }

    /// Stop the grain before its window completed.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Advance the grain by one frame and return its read position and envelope.
    /// Must only be called while the grain [`Self::is_active`].
    #[inline]
    pub fn process(&mut self, window: &GrainWindow<2048>) -> GrainFrame {
        debug_assert!(self.active, "Processing an idle grain");
        let frame = GrainFrame {
            position: self.position,
            envelope: window.sample(self.window_phase) * self.amplitude,
        };
        self.position += self.increment;
        self.window_phase += self.window_increment;
        self.samples_remaining -= 1;
        if self.samples_remaining == 0 {
            self.active = false;
        }
        frame
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_edges() {
        let window: GrainWindow<2048> = GrainWindow::new();
        // silent at both edges, peaks in the middle
        assert!(window.sample(0.0).abs() <= 1e-3);
        assert!(window.sample(1.0).abs() <= 1e-3);
        assert!((window.sample(0.5) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn window_is_unimodal() {
        let window: GrainWindow<2048> = GrainWindow::new();
        let mut previous = 0.0;
        let mut rising = true;
        for i in 0..=1000 {
            let value = window.sample(i as f32 / 1000.0);
            assert!((0.0..=1.0).contains(&value));
            if rising {
                if value < previous {
                    rising = false; // single turning point at the peak
                }
            } else {
                assert!(
                    value <= previous + 1e-6,
                    "Window rises again after its peak"
                );
            }
            previous = value;
        }
        assert!(!rising);
    }

    #[test]
    fn grain_lifecycle() {
        let window: GrainWindow<2048> = GrainWindow::new();
        let mut grain = Grain::new();
        assert!(!grain.is_active());

        grain.activate(100.0, 1.5, 10, 1.0, 0.0);
        assert!(grain.is_active());
        assert_eq!(grain.pan_left(), 0.5);
        assert_eq!(grain.pan_right(), 0.5);

        let mut positions = Vec::new();
        for _ in 0..10 {
            assert!(grain.is_active());
            positions.push(grain.process(&window).position);
        }
        // became idle after the configured duration, positions advanced by the increment
        assert!(!grain.is_active());
        assert_eq!(positions[0], 100.0);
        assert_eq!(positions[9], 100.0 + 9.0 * 1.5);

        // reactivation restarts the lifecycle
        grain.activate(0.0, -1.0, 4, 0.5, -1.0);
        assert!(grain.is_active());
        assert_eq!(grain.pan_left(), 1.0);
        assert_eq!(grain.pan_right(), 0.0);
        let frame = grain.process(&window);
        assert!(frame.envelope.abs() <= 0.5 * 1e-3 + f32::EPSILON);
    }
}
