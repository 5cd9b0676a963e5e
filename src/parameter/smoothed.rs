use std::fmt::Display;

use super::{FloatParameter, Parameter, ParameterValueUpdate};
use crate::utils::{ExponentialSmoothedValue, SmoothedValue};

// -------------------------------------------------------------------------------------------------

/// A [`FloatParameter`] whose value glides towards changes instead of jumping, for use inside
/// audio processing where hard value steps would be audible.
///
/// The smoother runs at audio rate: fetch one value per frame via [`Self::next_value`], or apply
/// [`Self::target_value`] blockwise while [`Self::is_ramping`] is false.
#[derive(Debug, Clone)]
pub struct SmoothedParameterValue<Value: SmoothedValue = ExponentialSmoothedValue> {
    description: FloatParameter,
    value: Value,
}

impl<Value: SmoothedValue> SmoothedParameterValue<Value> {
    /// Wrap the given smoother, initialized to the parameter's default value.
    pub fn new(description: FloatParameter, mut value: Value) -> Self {
        value.init(description.default_value());
        Self { description, value }
    }

    /// The wrapped parameter description.
    pub fn description(&self) -> &FloatParameter {
        &self.description
    }

    /// True while the value still moves towards the last set target.
    pub fn is_ramping(&self) -> bool {
        self.value.is_ramping()
    }

    /// Advance the smoother by one frame and return the new momentary value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.value.next()
    }

    /// The momentary value, without advancing the smoother.
    #[inline]
    pub fn current_value(&self) -> f32 {
        self.value.current()
    }

    /// The plain value the smoother moves towards.
    #[inline]
    pub fn target_value(&self) -> f32 {
        self.value.target()
    }

    /// Start a ramp towards the given plain value, clamped into the parameter's range.
    pub fn set_target_clamped(&mut self, value: f32) {
        self.value.set_target(self.description.clamp_value(value));
    }

    /// Jump to the given plain value, clamped into the parameter's range, without ramping.
    pub fn init_clamped(&mut self, value: f32) {
        self.value.init(self.description.clamp_value(value));
    }

    /// Apply a host or queue supplied update as a new ramp target.
    pub fn apply_update(&mut self, update: &ParameterValueUpdate) {
        match update {
            ParameterValueUpdate::Raw(raw) => {
                let raw_value = raw
                    .downcast_ref::<f32>()
                    .copied()
                    .or_else(|| raw.downcast_ref::<f64>().map(|&value| value as f32));
                match raw_value {
                    Some(value) => self.set_target_clamped(value),
                    None => log::warn!(
                        "Ignoring unsupported raw value for float parameter '{}'",
                        self.description.name()
                    ),
                }
            }
            ParameterValueUpdate::Normalized(normalized) => {
                self.value
                    .set_target(self.description.to_plain(*normalized));
            }
        }
    }
}

impl<Value: SmoothedValue> Display for SmoothedParameterValue<Value> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let include_unit = true;
        write!(
            f,
            "{}",
            self.description
                .value_to_string(self.value.target(), include_unit)
        )
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use four_cc::FourCC;

    use super::*;

    #[test]
    fn ramps_towards_targets() {
        let parameter = FloatParameter::new(FourCC(*b"gain"), "Gain", 0.0..=1.0, 0.5);
        let mut value =
            SmoothedParameterValue::new(parameter, ExponentialSmoothedValue::new(0.0, 44100));
        assert_eq!(value.current_value(), 0.5); // starts at the parameter default

        // targets are clamped into the parameter range and reached gradually
        value.set_target_clamped(2.0);
        assert_eq!(value.target_value(), 1.0);
        assert!(value.is_ramping());
        let first = value.next_value();
        assert!(first > 0.5 && first < 1.0);
        while value.is_ramping() {
            value.next_value();
        }
        assert_eq!(value.current_value(), 1.0);

        // init jumps without ramping
        value.init_clamped(-3.0);
        assert!(!value.is_ramping());
        assert_eq!(value.current_value(), 0.0);

        value.apply_update(&ParameterValueUpdate::Normalized(0.25));
        assert_eq!(value.target_value(), 0.25);
    }
}
