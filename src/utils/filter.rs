//! Filter building blocks for the granular post-processing and drum resonator stages.

pub mod one_pole;
pub mod svf;

pub use one_pole::OnePoleFilter;
pub use svf::{SvfFilter, SvfOutput};
