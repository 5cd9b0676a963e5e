//! Analog modeled drum synthesis: four percussion voices and a gate driven mixer unit.
//!
//! The voices are self contained mono generators rendering one sample per call, so they can be
//! used standalone or through the [`DrumMixer`] unit, which handles gate edge detection,
//! parameter plumbing and the final summing stage.

mod bass_drum;
pub use bass_drum::AnalogBassDrum;

mod snare_drum;
pub use snare_drum::AnalogSnareDrum;

mod hi_hat;
pub use hi_hat::MetallicHiHat;

mod fm_drum;
pub use fm_drum::{FmDrum, FmDrumMode};

mod mixer;
pub use mixer::{DrumMixer, DrumMixerMessage, DrumTriggerSender, DrumVoice};
