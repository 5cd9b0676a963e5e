use assume::assume;

// -------------------------------------------------------------------------------------------------

/// A circular audio buffer with interpolated fractional reads, shared by all granular players.
///
/// The capacity is rounded up to a power of two, so read and write positions wrap with a simple
/// bit mask. Read positions may be negative or beyond the capacity and always wrap into the
/// valid range instead of failing.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    mask: usize,
    write_position: usize,
    fade_remaining: usize,
}

impl AudioBuffer {
    /// Length of the crossfade which blends new content over old when writes resume
    /// with `fade_in` set, e.g. after leaving freeze.
    pub const FADE_LENGTH: usize = 256;

    const MIN_CAPACITY: usize = 64;

    /// Create a new buffer with at least the given capacity in samples, filled with silence.
    pub fn new(min_capacity: usize) -> Self {
        let capacity = min_capacity.max(Self::MIN_CAPACITY).next_power_of_two();
        Self {
            samples: vec![0.0; capacity],
            mask: capacity - 1,
            write_position: 0,
            fade_remaining: 0,
        }
    }

    /// The actual, power of two capacity in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Position the next written sample will land on.
    #[inline]
    pub fn write_position(&self) -> usize {
        self.write_position
    }

    /// Reset the buffer to silence and rewind the write position.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.write_position = 0;
        self.fade_remaining = 0;
    }

    /// Append samples at the write position, wrapping around at the capacity.
    ///
    /// With `fade_in` set, a linear crossfade of [`Self::FADE_LENGTH`] samples blends from the
    /// existing buffer content into the new material. The fade continues across subsequent
    /// `write` calls until it completed, so it may span multiple process blocks.
    pub fn write(&mut self, samples: &[f32], fade_in: bool) {
        if fade_in {
            self.fade_remaining = Self::FADE_LENGTH;
        }
        for sample in samples {
            let index = self.write_position & self.mask;
            if self.fade_remaining > 0 {
                let fade = self.fade_remaining as f32 / Self::FADE_LENGTH as f32;
                self.samples[index] = self.samples[index] * fade + *sample * (1.0 - fade);
                self.fade_remaining -= 1;
            } else {
                self.samples[index] = *sample;
            }
            self.write_position = (self.write_position + 1) & self.mask;
        }
    }

    /// Read a sample with 4-point, 3rd-order Hermite interpolation around the given integer
    /// position. `fraction` is the fractional sample offset in range [0, 1). Positions outside
    /// of the buffer, including negative ones, wrap around.
    #[inline]
    pub fn read_hermite(&self, position: isize, fraction: f32) -> f32 {
        assume!(unsafe: self.samples.len() == self.mask + 1, "capacity is a power of two");
        // two's complement bit masking wraps negative positions as well
        let xm1 = self.samples[(position - 1) as usize & self.mask];
        let x0 = self.samples[position as usize & self.mask];
        let x1 = self.samples[(position + 1) as usize & self.mask];
        let x2 = self.samples[(position + 2) as usize & self.mask];

        let c0 = x0;
        let c1 = 0.5 * (x1 - xm1);
        let c2 = xm1 - 2.5 * x0 + 2.0 * x1 - 0.5 * x2;
        let c3 = 0.5 * (x2 - xm1) + 1.5 * (x0 - x1);
        ((c3 * fraction + c2) * fraction + c1) * fraction + c0
    }

    /// Read a sample at a fractional position, splitting it into the integer and fractional
    /// parts for [`Self::read_hermite`].
    #[inline]
    pub fn read_interpolated(&self, position: f64) -> f32 {
        let integral = position.floor();
        let fraction = (position - integral) as f32;
        self.read_hermite(integral as isize, fraction)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounding() {
        assert_eq!(AudioBuffer::new(1000).capacity(), 1024);
        assert_eq!(AudioBuffer::new(1024).capacity(), 1024);
        assert_eq!(AudioBuffer::new(1025).capacity(), 2048);
        assert_eq!(AudioBuffer::new(0).capacity(), 64);
    }

    #[test]
    fn wrap_around() {
        let mut buffer = AudioBuffer::new(64);
        assert_eq!(buffer.capacity(), 64);

        // write 1.5 times the capacity: the last 64 written samples must survive
        let samples = (0..96).map(|i| i as f32).collect::<Vec<_>>();
        buffer.write(&samples, false);
        assert_eq!(buffer.write_position(), 96 & 63);

        // sample 95 sits right behind the write position
        assert_eq!(buffer.read_hermite(95, 0.0), 95.0);
        assert_eq!(buffer.read_hermite(95 & 63, 0.0), 95.0);
        // the oldest surviving sample is 32 (sample 95 - 63)
        assert_eq!(buffer.read_hermite(32, 0.0), 32.0);

        // negative positions wrap to the end of the buffer
        assert_eq!(buffer.read_hermite(-1, 0.0), buffer.read_hermite(63, 0.0));
        assert_eq!(buffer.read_interpolated(-65.0), buffer.read_hermite(63, 0.0));
    }

    #[test]
    fn interpolation() {
        let mut buffer = AudioBuffer::new(64);
        buffer.write(&[0.0, 1.0, 2.0, 3.0, 4.0], false);

        // zero fraction reproduces samples exactly
        assert_eq!(buffer.read_hermite(2, 0.0), 2.0);
        // a linear ramp stays linear under cubic interpolation
        assert!((buffer.read_hermite(2, 0.5) - 2.5).abs() < 1e-6);
        assert!((buffer.read_interpolated(1.25) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn fade_in_write() {
        let mut buffer = AudioBuffer::new(1024);
        let ones = vec![1.0; 1024];
        buffer.write(&ones, false);

        // resume writing silence with a fade: old content is blended out linearly
        let silence = vec![0.0; AudioBuffer::FADE_LENGTH];
        buffer.write(&silence, true);

        let first = buffer.read_hermite(0, 0.0);
        let middle = buffer.read_hermite(AudioBuffer::FADE_LENGTH as isize / 2, 0.0);
        let last = buffer.read_hermite(AudioBuffer::FADE_LENGTH as isize - 1, 0.0);
        assert!((first - 1.0).abs() < 0.01);
        assert!((middle - 0.5).abs() < 0.01);
        assert!(last < 0.01);

        // after the fade completed, writes are verbatim again
        buffer.write(&[0.25], false);
        assert_eq!(
            buffer.read_hermite(AudioBuffer::FADE_LENGTH as isize, 0.0),
            0.25
        );
    }
}
