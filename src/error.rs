use std::{error, fmt};

// -------------------------------------------------------------------------------------------------

/// Errors raised by DSP units and parameter handling in this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An invalid parameter id, value or configuration was passed to a unit.
    ParameterError(String),
    /// A unit was created or initialized with an unsupported channel layout.
    ChannelCountError(usize),
    /// A lock-free message could not be delivered to a running unit.
    SendError(String),
}

// -------------------------------------------------------------------------------------------------

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterError(message) => {
                write!(f, "Parameter error: {message}")
            }
            Self::ChannelCountError(channel_count) => {
                write!(f, "Unsupported channel count: {channel_count}")
            }
            Self::SendError(message) => {
                write!(f, "Failed to send message to audio unit: {message}")
            }
        }
    }
}

impl error::Error for Error {}
