//! Parameter descriptions and value holders shared by all audio units.

use std::{any::Any, fmt::Debug, ops::RangeInclusive};

use four_cc::FourCC;

// -------------------------------------------------------------------------------------------------

/// The kind of control a [`Parameter`] describes, with everything a UI needs to render it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterType {
    /// A continuous value within a plain value range.
    Float {
        range: RangeInclusive<f32>,
        default: f32,
    },
    /// A selection from a fixed list of variant names.
    Enum {
        variants: &'static [&'static str],
        default_index: usize,
    },
    /// An on/off toggle.
    Boolean { default: bool },
}

// -------------------------------------------------------------------------------------------------

/// A single automatable control of an [`AudioUnit`](crate::AudioUnit).
///
/// Hosts address parameters by their [`FourCC`] id and exchange values as normalized floats in
/// range \[0, 1\], mapped linearly onto the parameter's plain range.
pub trait Parameter: Debug {
    /// Unique id of the parameter within its unit.
    fn id(&self) -> FourCC;

    /// Human readable parameter name.
    fn name(&self) -> &'static str;

    /// The parameter's kind, value range and default.
    fn parameter_type(&self) -> ParameterType;

    /// Format a normalized value for display.
    fn normalized_value_to_string(&self, normalized: f32, include_unit: bool) -> String;

    /// Parse a display string back into a normalized value.
    /// Returns `None` when the string cannot be parsed.
    fn string_to_normalized_value(&self, string: &str) -> Option<f32>;
}

/// A [`Parameter`] that can be cloned into a boxed trait object, so hosts can keep copies of the
/// parameter descriptions a unit hands out.
pub trait ClonableParameter: Parameter {
    fn dyn_clone(&self) -> Box<dyn ClonableParameter>;
}

impl<P> ClonableParameter for P
where
    P: Parameter + Clone + 'static,
{
    fn dyn_clone(&self) -> Box<dyn ClonableParameter> {
        Box::new(self.clone())
    }
}

// -------------------------------------------------------------------------------------------------

/// A pending change to a single parameter's value, delivered to a running unit and applied in
/// audio time.
#[derive(Debug)]
pub enum ParameterValueUpdate {
    /// A plain, type-erased value: `f32`/`f64` for floats, `bool` for toggles, and either the
    /// typed enum or its `String` name for enums.
    Raw(Box<dyn Any + Send + Sync>),
    /// A normalized value in range \[0, 1\].
    Normalized(f32),
}

// -------------------------------------------------------------------------------------------------

mod float;
pub use float::{FloatParameter, FloatParameterValue};

mod smoothed;
pub use smoothed::SmoothedParameterValue;

mod r#enum;
pub use r#enum::{EnumParameter, EnumParameterValue};

mod boolean;
pub use boolean::{BooleanParameter, BooleanParameterValue};
