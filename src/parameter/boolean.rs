use std::fmt::Display;

use four_cc::FourCC;

use super::{Parameter, ParameterType, ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// An on/off toggle parameter descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanParameter {
    id: FourCC,
    name: &'static str,
    default: bool,
}

impl BooleanParameter {
    const ON: &'static str = "ON";
    const OFF: &'static str = "OFF";

    pub const fn new(id: FourCC, name: &'static str, default: bool) -> Self {
        Self { id, name, default }
    }

    /// The parameter's default value.
    pub const fn default_value(&self) -> bool {
        self.default
    }

    /// Map the value to the normalized \[0, 1\] range.
    pub const fn to_normalized(&self, value: bool) -> f32 {
        if value {
            1.0
        } else {
            0.0
        }
    }

    /// Map a normalized \[0, 1\] value to a plain value.
    pub fn to_plain(&self, normalized: f32) -> bool {
        normalized >= 0.5
    }

    pub const fn value_to_string(&self, value: bool) -> &'static str {
        if value {
            Self::ON
        } else {
            Self::OFF
        }
    }

    /// Parse "ON"/"OFF" in any case, or Rust's "true"/"false".
    pub fn string_to_value(&self, string: &str) -> Option<bool> {
        let string = string.trim();
        if string.eq_ignore_ascii_case(Self::ON) {
            Some(true)
        } else if string.eq_ignore_ascii_case(Self::OFF) {
            Some(false)
        } else {
            string.parse().ok()
        }
    }
}

impl Parameter for BooleanParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Boolean {
            default: self.default,
        }
    }

    fn normalized_value_to_string(&self, normalized: f32, _include_unit: bool) -> String {
        self.value_to_string(self.to_plain(normalized)).to_string()
    }

    fn string_to_normalized_value(&self, string: &str) -> Option<f32> {
        self.string_to_value(string)
            .map(|value| self.to_normalized(value))
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`BooleanParameter`] paired with its current value.
#[derive(Debug, Clone)]
pub struct BooleanParameterValue {
    description: BooleanParameter,
    value: bool,
}

impl BooleanParameterValue {
    /// Create a value holder initialized to the parameter's default.
    pub fn new(description: BooleanParameter) -> Self {
        Self {
            value: description.default_value(),
            description,
        }
    }

    /// The wrapped parameter description.
    pub fn description(&self) -> &BooleanParameter {
        &self.description
    }

    /// The current value.
    #[inline]
    pub fn value(&self) -> bool {
        self.value
    }

    /// Set a new value.
    pub fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    /// Apply a host or queue supplied update.
    pub fn apply_update(&mut self, update: &ParameterValueUpdate) {
        match update {
            ParameterValueUpdate::Raw(raw) => match raw.downcast_ref::<bool>() {
                Some(value) => self.value = *value,
                None => log::warn!(
                    "Ignoring unsupported raw value for boolean parameter '{}'",
                    self.description.name()
                ),
            },
            ParameterValueUpdate::Normalized(normalized) => {
                self.value = self.description.to_plain(*normalized);
            }
        }
    }
}

impl Display for BooleanParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description.value_to_string(self.value))
    }
}

// -------------------------------------------------------------------------------------------------
