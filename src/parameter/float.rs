use std::{fmt::Display, ops::RangeInclusive};

use four_cc::FourCC;

use super::{Parameter, ParameterType, ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// A continuous float control with a plain value range and an optional display unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatParameter {
    id: FourCC,
    name: &'static str,
    range: RangeInclusive<f32>,
    default: f32,
    unit: &'static str,
}

impl FloatParameter {
    pub const fn new(
        id: FourCC,
        name: &'static str,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        assert!(
            default >= *range.start() && default <= *range.end(),
            "Parameter default out of range"
        );
        Self {
            id,
            name,
            range,
            default,
            unit: "",
        }
    }

    /// Attach a unit suffix such as "hz" or "st" for display strings.
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// The parameter's plain value range.
    pub fn range(&self) -> &RangeInclusive<f32> {
        &self.range
    }

    /// The parameter's default plain value.
    pub const fn default_value(&self) -> f32 {
        self.default
    }

    /// Clamp a plain value into the parameter's range.
    pub fn clamp_value(&self, value: f32) -> f32 {
        value.clamp(*self.range.start(), *self.range.end())
    }

    /// Map a plain value to the normalized \[0, 1\] range.
    pub fn to_normalized(&self, value: f32) -> f32 {
        let (min, max) = (*self.range.start(), *self.range.end());
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }

    /// Map a normalized \[0, 1\] value back to the plain range. Out of range input is clamped.
    pub fn to_plain(&self, normalized: f32) -> f32 {
        let (min, max) = (*self.range.start(), *self.range.end());
        min + normalized.clamp(0.0, 1.0) * (max - min)
    }

    /// Format a plain value for display, with the unit suffix when requested.
    pub fn value_to_string(&self, value: f32, include_unit: bool) -> String {
        if include_unit && !self.unit.is_empty() {
            format!("{:.2} {}", value, self.unit)
        } else {
            format!("{value:.2}")
        }
    }

    /// Parse a display string, with or without the unit suffix, into a clamped plain value.
    pub fn string_to_value(&self, string: &str) -> Option<f32> {
        let string = string.trim().trim_end_matches(self.unit).trim();
        string.parse().ok().map(|value| self.clamp_value(value))
    }
}

impl Parameter for FloatParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Float {
            range: self.range.clone(),
            default: self.default,
        }
    }

    fn normalized_value_to_string(&self, normalized: f32, include_unit: bool) -> String {
        self.value_to_string(self.to_plain(normalized), include_unit)
    }

    fn string_to_normalized_value(&self, string: &str) -> Option<f32> {
        self.string_to_value(string)
            .map(|value| self.to_normalized(value))
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`FloatParameter`] paired with its current plain value.
#[derive(Debug, Clone)]
pub struct FloatParameterValue {
    description: FloatParameter,
    value: f32,
}

impl FloatParameterValue {
    /// Create a value holder initialized to the parameter's default.
    pub fn new(description: FloatParameter) -> Self {
        Self {
            value: description.default_value(),
            description,
        }
    }

    /// The wrapped parameter description.
    pub fn description(&self) -> &FloatParameter {
        &self.description
    }

    /// The current plain value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Set a new plain value, clamped into the parameter's range.
    pub fn set_clamped(&mut self, value: f32) {
        self.value = self.description.clamp_value(value);
    }

    /// Apply a host or queue supplied update.
    pub fn apply_update(&mut self, update: &ParameterValueUpdate) {
        match update {
            ParameterValueUpdate::Raw(raw) => {
                let raw_value = raw
                    .downcast_ref::<f32>()
                    .copied()
                    .or_else(|| raw.downcast_ref::<f64>().map(|&value| value as f32));
                match raw_value {
                    Some(value) => self.set_clamped(value),
                    None => log::warn!(
                        "Ignoring unsupported raw value for float parameter '{}'",
                        self.description.name()
                    ),
                }
            }
            ParameterValueUpdate::Normalized(normalized) => {
                self.value = self.description.to_plain(*normalized);
            }
        }
    }
}

impl Display for FloatParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let include_unit = true;
        write!(
            f,
            "{}",
            self.description.value_to_string(self.value, include_unit)
        )
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_mapping() {
        let frequency =
            FloatParameter::new(FourCC(*b"freq"), "Frequency", 20.0..=200.0, 50.0).with_unit("hz");

        assert_eq!(frequency.default_value(), 50.0);
        assert_eq!(frequency.clamp_value(500.0), 200.0);
        assert_eq!(frequency.to_normalized(20.0), 0.0);
        assert_eq!(frequency.to_normalized(200.0), 1.0);
        assert_eq!(frequency.to_plain(0.5), 110.0);
        // out of range input is clamped on both ends
        assert_eq!(frequency.to_plain(2.0), 200.0);
        assert_eq!(frequency.to_normalized(1000.0), 1.0);

        assert_eq!(frequency.value_to_string(50.0, true), "50.00 hz");
        assert_eq!(frequency.value_to_string(50.0, false), "50.00");
        assert_eq!(frequency.string_to_value("110 hz"), Some(110.0));
        assert_eq!(frequency.string_to_value("not a number"), None);
    }

    #[test]
    fn updates() {
        let parameter = FloatParameter::new(FourCC(*b"tone"), "Tone", 0.0..=1.0, 0.5);
        let mut value = FloatParameterValue::new(parameter);
        assert_eq!(value.value(), 0.5);

        value.apply_update(&ParameterValueUpdate::Normalized(0.25));
        assert_eq!(value.value(), 0.25);

        value.apply_update(&ParameterValueUpdate::Raw(Box::new(2.0f32)));
        assert_eq!(value.value(), 1.0); // clamped

        value.set_clamped(-1.0);
        assert_eq!(value.value(), 0.0);
    }
}
