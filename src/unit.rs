//! The common interface for all realtime DSP units in this crate.

use std::{any::Any, fmt::Debug};

use four_cc::FourCC;

use crate::{parameter::ParameterValueUpdate, ClonableParameter, Error};

// -------------------------------------------------------------------------------------------------

/// Carries an [`AudioUnit`] specific message payload, to schedule changes which are not plain
/// parameter updates, such as manually triggering a drum voice.
///
/// Message enums are declared next to the unit which consumes them and get dispatched via
/// [`AudioUnit::process_message`], which downcasts the payload back to the concrete type.
pub trait UnitMessage: Any + Debug + Send + Sync {
    /// Name of the unit this message is intended for, matching [`AudioUnit::name`].
    fn unit_name(&self) -> &'static str;
    /// Access to the message as [`Any`] for downcasting in the unit's message handler.
    fn payload(&self) -> &dyn Any;
}

/// [`UnitMessage`] payload type, as passed to [`AudioUnit::process_message`].
pub type UnitMessagePayload = dyn UnitMessage;

// -------------------------------------------------------------------------------------------------

/// A realtime audio processing unit which consumes and produces interleaved `f32` sample buffers.
///
/// Units are driven by a host in blocks of up to the `max_frames` length passed to
/// [`Self::initialize`]. All processing functions are called from a single audio thread, so
/// implementations do not need internal locks, but they must not allocate or block in
/// [`Self::process`].
///
/// Parameter and message updates are applied between blocks via
/// [`Self::process_parameter_update`] and [`Self::process_message`]. For lock-free delivery
/// from other threads, units may additionally expose their own queue based senders.
pub trait AudioUnit: Send + Sync + 'static {
    /// A unique, descriptive name of the unit.
    fn name(&self) -> &'static str;

    /// Descriptors of all automatable parameters of this unit.
    fn parameters(&self) -> Vec<&dyn ClonableParameter>;

    /// Number of input channels the unit consumes.
    fn input_channels(&self) -> usize;
    /// Number of output channels the unit produces.
    fn output_channels(&self) -> usize;

    /// Initialize or reconfigure the unit for the given sample rate and maximum block length
    /// in sample frames. Called before any processing starts, off the audio thread, so
    /// implementations are free to allocate here.
    fn initialize(&mut self, sample_rate: u32, max_frames: usize) -> Result<(), Error>;

    /// Reset all internal state without dropping allocated resources, e.g. when the host's
    /// transport jumps to a new position.
    fn reset(&mut self);

    /// Process a single block of interleaved audio. `input` must hold
    /// `frame_count * input_channels` samples and `output` `frame_count * output_channels`
    /// samples with the same frame count.
    fn process(&mut self, input: &[f32], output: &mut [f32]);

    /// Apply a single parameter update. Called in the audio thread between blocks.
    fn process_parameter_update(
        &mut self,
        id: FourCC,
        value: &ParameterValueUpdate,
    ) -> Result<(), Error>;

    /// Handle a custom unit message. Called in the audio thread between blocks.
    ///
    /// The default implementation rejects all messages: units with custom messages downcast
    /// the payload to their message enum here.
    fn process_message(&mut self, message: &UnitMessagePayload) -> Result<(), Error> {
        Err(Error::ParameterError(format!(
            "Audio unit '{}' received an unexpected message: {:?}",
            self.name(),
            message
        )))
    }
}
