// -------------------------------------------------------------------------------------------------

/// Allpass feedback coefficient of all diffuser stages.
const DIFFUSION: f32 = 0.625;

/// Per channel allpass delay lengths in samples, mutually prime-ish to avoid resonances.
const LEFT_DELAYS: [usize; 4] = [126, 180, 269, 444];
const RIGHT_DELAYS: [usize; 4] = [151, 205, 245, 405];

// -------------------------------------------------------------------------------------------------

/// A single Schroeder allpass stage with a fixed delay length.
#[derive(Debug)]
struct Allpass {
    buffer: Vec<f32>,
    index: usize,
}

impl Allpass {
    fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length],
            index: 0,
        }
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.index];
        let feedback = input + delayed * DIFFUSION;
        self.buffer[self.index] = feedback;
        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }
        delayed - feedback * DIFFUSION
    }
}

// -------------------------------------------------------------------------------------------------

/// Smears transients by running each channel through four allpass stages in series, with
/// different delay lengths per channel to decorrelate the stereo image.
///
/// The dry signal blends towards the diffused one with the given amount, which the processor
/// raises once the texture parameter enters its diffusion range.
#[derive(Debug)]
pub(crate) struct Diffuser {
    left: [Allpass; 4],
    right: [Allpass; 4],
}

impl Diffuser {
    pub fn new() -> Self {
        Self {
            left: LEFT_DELAYS.map(Allpass::new),
            right: RIGHT_DELAYS.map(Allpass::new),
        }
    }

    pub fn reset(&mut self) {
        for allpass in self.left.iter_mut().chain(self.right.iter_mut()) {
            allpass.reset();
        }
    }

    /// Diffuse both channels in place. `amount` is the wet blend in range [0, 1].
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32], amount: f32) {
        debug_assert_eq!(left.len(), right.len());
        let amount = amount.clamp(0.0, 1.0);

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mut wet_left = *l;
            let mut wet_right = *r;
            for stage in 0..4 {
                wet_left = self.left[stage].process(wet_left);
                wet_right = self.right[stage].process(wet_right);
            }
            *l += amount * (wet_left - *l);
            *r += amount * (wet_right - *r);
        }
    }
}

// -------------------------------------------------------------------------------------------------
