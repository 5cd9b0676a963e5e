use super::{buffer::AudioBuffer, parameters::GranularParameters};
use crate::utils::smoothed::{LinearSmoothedValue, SmoothedValue};

// -------------------------------------------------------------------------------------------------

/// Shortest frozen loop in samples.
pub(super) const MIN_LOOP_LENGTH: usize = 1024;

/// Delay slew time towards a new position, in seconds. The slew produces the tape style pitch
/// bend when the position moves.
const SLEW_SECONDS: f32 = 0.1;

// -------------------------------------------------------------------------------------------------

/// A tape style delay reading a single smoothed tap from the shared audio buffers.
///
/// While recording, the position parameter selects the delay time and changes slew towards the
/// new tap with a linear ramp, bending pitch like a tape machine. When frozen, the player locks
/// a loop of the most recently recorded audio and replays it with sample exact periodicity, with
/// the size parameter selecting the loop length.
#[derive(Debug)]
pub(crate) struct LoopingPlayer {
    delay: LinearSmoothedValue,
    loop_start: isize,
    loop_length: usize,
    loop_phase: usize,
    frozen: bool,
    initialized: bool,
    sample_rate: u32,
}

impl LoopingPlayer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            delay: LinearSmoothedValue::new(1.0, sample_rate),
            loop_start: 0,
            loop_length: MIN_LOOP_LENGTH,
            loop_phase: 0,
            frozen: false,
            initialized: false,
            sample_rate,
        }
    }

    pub fn reset(&mut self) {
        self.loop_phase = 0;
        self.frozen = false;
        // the delay re-inits from the position parameter on the next block
        self.initialized = false;
    }

    #[cfg(test)]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Render one block into the given output slices, overwriting them.
    ///
    /// The block length must match the number of frames written to the buffers for this block,
    /// as the tap positions are derived from the buffer's write position.
    pub fn process(
        &mut self,
        buffers: &[AudioBuffer],
        parameters: &GranularParameters,
        output_left: &mut [f32],
        output_right: &mut [f32],
    ) {
        debug_assert!(!buffers.is_empty(), "Missing source buffers");
        debug_assert_eq!(output_left.len(), output_right.len());

        let capacity = buffers[0].capacity();
        let stereo = buffers.len() >= 2;
        let frames = output_left.len();

        self.update_loop(buffers, parameters);
        self.update_delay_target(parameters, capacity);

        if self.frozen {
            for frame in 0..frames {
                let position = self.loop_start + self.loop_phase as isize;
                let left = buffers[0].read_hermite(position, 0.0);
                let right = if stereo {
                    buffers[1].read_hermite(position, 0.0)
                } else {
                    left
                };
                output_left[frame] = left;
                output_right[frame] = right;
                self.loop_phase += 1;
                if self.loop_phase >= self.loop_length {
                    self.loop_phase = 0;
                }
            }
        } else {
            // frame f of this block was recorded at (write_position - frames + f)
            let base = buffers[0].write_position() as f64 - frames as f64;
            for frame in 0..frames {
                let delay = self.delay.next() as f64;
                let position = base + frame as f64 - delay;
                output_left[frame] = buffers[0].read_interpolated(position);
                output_right[frame] = if stereo {
                    buffers[1].read_interpolated(position)
                } else {
                    output_left[frame]
                };
            }
        }
    }

    /// Loop length in samples for a normalized size, given the buffer capacity.
    fn loop_length_for_size(size: f32, capacity: usize) -> usize {
        let max_length = capacity / 2;
        let length = MIN_LOOP_LENGTH as f32
            + size.clamp(0.0, 1.0) * (max_length - MIN_LOOP_LENGTH) as f32;
        (length as usize).clamp(MIN_LOOP_LENGTH, max_length)
    }

    /// Track freeze transitions and the live loop length.
    fn update_loop(&mut self, buffers: &[AudioBuffer], parameters: &GranularParameters) {
        let capacity = buffers[0].capacity();
        self.loop_length = Self::loop_length_for_size(parameters.size, capacity);
        if self.loop_phase >= self.loop_length {
            self.loop_phase = 0;
        }

        if parameters.freeze && !self.frozen {
            // lock a loop ending at the current write position
            self.frozen = true;
            self.loop_start = buffers[0].write_position() as isize - self.loop_length as isize;
            self.loop_phase = 0;
        } else if !parameters.freeze && self.frozen {
            // resume delay playback from where the loop read head currently sits
            self.frozen = false;
            let read_position = self.loop_start + self.loop_phase as isize;
            let distance =
                (buffers[0].write_position() as isize - read_position).rem_euclid(capacity as isize);
            self.delay.init(distance as f32);
            self.initialized = true;
        }
    }

    /// Slew the delay towards the position parameter's target.
    fn update_delay_target(&mut self, parameters: &GranularParameters, capacity: usize) {
        let target = 1.0 + parameters.position.clamp(0.0, 1.0) * capacity as f32 * 0.9;
        if !self.initialized {
            self.delay.init(target);
            self.initialized = true;
        } else if (target - self.delay.target()).abs() > 1.0 {
            let slew_frames = (SLEW_SECONDS * self.sample_rate as f32) as u32;
            self.delay.set_target_in(target, slew_frames.max(1));
        }
    }
}

// -------------------------------------------------------------------------------------------------
