use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Quantity, REFERENCE_AMOUNT};
use crate::error::EngineError;

/// Units a food, ingredient or meal item quantity can be recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Ml,
    Unit,
    Tablespoon,
    Teaspoon,
    Cup,
    Slice,
    Portion,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::G => "g",
            Unit::Ml => "ml",
            Unit::Unit => "unit",
            Unit::Tablespoon => "tablespoon",
            Unit::Teaspoon => "teaspoon",
            Unit::Cup => "cup",
            Unit::Slice => "slice",
            Unit::Portion => "portion",
        }
    }

    /// g and ml are the base (gram-equivalent) units.
    pub fn is_base(&self) -> bool {
        matches!(self, Unit::G | Unit::Ml)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "g" => Unit::G,
            "ml" => Unit::Ml,
            "unit" => Unit::Unit,
            "tablespoon" => Unit::Tablespoon,
            "teaspoon" => Unit::Teaspoon,
            "cup" => Unit::Cup,
            "slice" => Unit::Slice,
            "portion" => Unit::Portion,
            other => anyhow::bail!("unknown unit `{other}`"),
        })
    }
}

/// Converts a food quantity to gram-equivalents using the food's conversion factors.
/// `Ok(None)` when the food has no usable factor for `unit`; an amount too large
/// to represent is an invalid quantity.
pub fn food_reference_amount(
    quantity: Quantity,
    unit: Unit,
    conversion_factors: &BTreeMap<Unit, f64>,
) -> Result<Option<Quantity>, EngineError> {
    let factor = match conversion_factors.get(&unit) {
        Some(f) if f.is_finite() && *f > 0.0 => *f,
        Some(_) => return Ok(None),
        None if unit.is_base() => 1.0,
        None => return Ok(None),
    };
    Quantity::new(quantity.get() * factor).map(Some)
}

/// Converts a recipe quantity to reference units of its per-serving profile.
/// One portion is one serving.
pub fn recipe_reference_amount(quantity: Quantity, unit: Unit) -> Result<Option<Quantity>, EngineError> {
    match unit {
        Unit::Portion => Quantity::new(quantity.get() * REFERENCE_AMOUNT).map(Some),
        u if u.is_base() => Ok(Some(quantity)),
        _ => Ok(None),
    }
}
