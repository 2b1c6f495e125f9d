use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Nutrient profiles are stored per this many reference units (grams).
pub const REFERENCE_AMOUNT: f64 = 100.0;

/// The five tracked nutrient values of a food, serving or meal item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl Nutrients {
    pub const ZERO: Nutrients = Nutrients {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        fiber: 0.0,
    };

    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            fiber,
        }
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            calories: f(self.calories),
            protein: f(self.protein),
            carbs: f(self.carbs),
            fat: f(self.fat),
            fiber: f(self.fiber),
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Divides every field. Callers guard against a zero divisor.
    pub fn divided(self, divisor: f64) -> Self {
        self.map(|v| v / divisor)
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
            fiber: self.fiber + rhs.fiber,
        }
    }
}

impl AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Nutrients) {
        *self = *self + rhs;
    }
}

impl Sum for Nutrients {
    fn sum<I: Iterator<Item = Nutrients>>(iter: I) -> Self {
        iter.fold(Nutrients::ZERO, Add::add)
    }
}

/// A strictly positive, finite amount. Invalid amounts never reach the scaler.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quantity(f64);

impl Quantity {
    pub fn new(value: f64) -> Result<Self, EngineError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidQuantity(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Quantity {
    type Error = EngineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for f64 {
    fn from(q: Quantity) -> f64 {
        q.0
    }
}

/// Scales a per-100-unit profile to the absolute values for `quantity` reference units.
pub fn scale(profile: &Nutrients, quantity: Quantity) -> Nutrients {
    profile.scaled(quantity.get() / REFERENCE_AMOUNT)
}
