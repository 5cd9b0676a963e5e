//! Granular audio processing: records live input into circular buffers and plays it back as
//! granular clouds, looped tape delays or shimmer textures.
//!
//! [`GranularProcessor`] is the plain, planar processing core. [`GranularProcessorUnit`] wraps
//! it into an [`AudioUnit`](crate::AudioUnit) with interleaved buffers and automatable
//! parameters.

mod buffer;
pub use buffer::AudioBuffer;

mod parameters;
pub use parameters::{GranularParameters, PlaybackMode};

mod processor;
pub use processor::{GranularParameterSender, GranularProcessor, GranularProcessorUnit};

mod diffuser;
mod grain;
mod looper;
mod pitch_shifter;
mod player;
