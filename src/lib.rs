#![cfg_attr(all(doc, docsrs), feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]

// internal mods, re-exported below
mod error;
mod parameter;
mod unit;

// flat re-exports of the common types
pub use error::Error;

pub use parameter::{
    BooleanParameter, BooleanParameterValue, ClonableParameter, EnumParameter, EnumParameterValue,
    FloatParameter, FloatParameterValue, Parameter, ParameterType, ParameterValueUpdate,
    SmoothedParameterValue,
};

pub use unit::{AudioUnit, UnitMessage, UnitMessagePayload};

// public mods
pub mod drums;
pub mod granular;
pub mod utils;
