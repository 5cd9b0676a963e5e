//! Shared DSP primitives: interleaved buffer helpers, parameter smoothing,
//! filters and common math used by the granular and drum units.

pub mod buffer;
pub mod dsp;
pub mod filter;
pub mod smoothed;

pub use buffer::{interleaved_to_planar, planar_to_interleaved};
pub use smoothed::{ExponentialSmoothedValue, LinearSmoothedValue, SmoothedValue};
