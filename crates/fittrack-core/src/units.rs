// Weight conversion helpers
//
// Everything is stored in kilograms; pounds only exist at the display edge.
// Conversions round to one decimal, so kg -> lb -> kg can drift by 0.1.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

pub const LB_PER_KG: f64 = 2.20462;

/// Round to one decimal place, halves away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn to_pounds(kg: f64) -> f64 {
    round1(kg * LB_PER_KG)
}

pub fn to_kg(lb: f64) -> f64 {
    round1(lb / LB_PER_KG)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lb),
            other => Err(Error::Validation(format!("unknown weight unit '{}'", other))),
        }
    }
}

/// Convert between units; same-unit conversions still round
pub fn convert(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    match (from, to) {
        (WeightUnit::Kg, WeightUnit::Lb) => to_pounds(value),
        (WeightUnit::Lb, WeightUnit::Kg) => to_kg(value),
        _ => round1(value),
    }
}

/// Render a stored kilogram value in the user's unit, e.g. "45.4 kg"
pub fn format_weight(kg: f64, unit: WeightUnit) -> String {
    format!("{:.1} {}", convert(kg, WeightUnit::Kg, unit), unit)
}
