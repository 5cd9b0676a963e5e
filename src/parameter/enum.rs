use std::{fmt::Debug, str::FromStr};

use four_cc::FourCC;
use strum::VariantNames;

use super::{Parameter, ParameterType, ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// A parameter that selects one of the named variants of a Rust enum.
///
/// The variant list is taken from [`strum::VariantNames`], so value types have to derive
/// `strum::VariantNames` along with `strum::Display` and `strum::EnumString`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParameter {
    id: FourCC,
    name: &'static str,
    variants: &'static [&'static str],
    default_index: usize,
}

impl EnumParameter {
    pub fn new<E>(id: FourCC, name: &'static str, default: E) -> Self
    where
        E: VariantNames + ToString,
    {
        let variants = E::VARIANTS;
        assert!(!variants.is_empty(), "Enum parameter without variants");
        let default_name = default.to_string();
        let default_index = variants
            .iter()
            .position(|variant| **variant == default_name)
            .unwrap_or(0);
        Self {
            id,
            name,
            variants,
            default_index,
        }
    }

    /// All selectable variant names.
    pub fn variants(&self) -> &'static [&'static str] {
        self.variants
    }

    /// The default variant's name.
    pub fn default_value(&self) -> &'static str {
        self.variants[self.default_index]
    }

    /// The position of the given variant name, if it is selectable.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.variants.iter().position(|variant| *variant == name)
    }

    /// Map a variant name to the normalized \[0, 1\] range. Unknown names map to the default.
    pub fn to_normalized(&self, name: &str) -> f32 {
        self.index_to_normalized(self.index_of(name).unwrap_or(self.default_index))
    }

    /// Map a normalized \[0, 1\] value to the nearest variant name.
    pub fn to_variant(&self, normalized: f32) -> &'static str {
        let last = self.variants.len() - 1;
        let index = (normalized.clamp(0.0, 1.0) * last as f32).round() as usize;
        self.variants[index.min(last)]
    }

    fn index_to_normalized(&self, index: usize) -> f32 {
        match self.variants.len() {
            0 | 1 => 0.0,
            len => index as f32 / (len - 1) as f32,
        }
    }
}

impl Parameter for EnumParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Enum {
            variants: self.variants,
            default_index: self.default_index,
        }
    }

    fn normalized_value_to_string(&self, normalized: f32, _include_unit: bool) -> String {
        self.to_variant(normalized).to_string()
    }

    fn string_to_normalized_value(&self, string: &str) -> Option<f32> {
        self.index_of(string)
            .map(|index| self.index_to_normalized(index))
    }
}

// -------------------------------------------------------------------------------------------------

/// An [`EnumParameter`] paired with its currently selected, typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumParameterValue<T: Clone> {
    description: EnumParameter,
    value: T,
}

impl<T> EnumParameterValue<T>
where
    T: FromStr + Clone + 'static,
    T::Err: Debug,
{
    /// Create a value holder initialized to the parameter's default variant.
    pub fn new(description: EnumParameter) -> Self {
        let value = T::from_str(description.default_value()).unwrap();
        Self { description, value }
    }

    /// The wrapped parameter description.
    pub fn description(&self) -> &EnumParameter {
        &self.description
    }

    /// The currently selected value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Select a new value.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Apply a host or queue supplied update.
    pub fn apply_update(&mut self, update: &ParameterValueUpdate) {
        match update {
            ParameterValueUpdate::Raw(raw) => {
                if let Some(value) = raw.downcast_ref::<T>() {
                    self.value = value.clone();
                } else if let Some(value) = raw
                    .downcast_ref::<String>()
                    .and_then(|name| T::from_str(name.trim()).ok())
                {
                    self.value = value;
                } else {
                    log::warn!(
                        "Ignoring unsupported raw value for enum parameter '{}'",
                        self.description.name()
                    );
                }
            }
            ParameterValueUpdate::Normalized(normalized) => {
                if let Ok(value) = T::from_str(self.description.to_variant(*normalized)) {
                    self.value = value;
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------
