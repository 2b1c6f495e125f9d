use serde::{Deserialize, Serialize};

use super::Nutrients;

pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Share of macro energy (percent) coming from protein, carbs and fat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroDistribution {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroDistribution {
    /// All zero when the totals carry no macro energy.
    pub fn from_totals(totals: &Nutrients) -> Self {
        let protein = totals.protein * KCAL_PER_GRAM_PROTEIN;
        let carbs = totals.carbs * KCAL_PER_GRAM_CARBS;
        let fat = totals.fat * KCAL_PER_GRAM_FAT;
        let energy = protein + carbs + fat;

        if energy <= 0.0 || !energy.is_finite() {
            return Self::default();
        }

        Self {
            protein: protein / energy * 100.0,
            carbs: carbs / energy * 100.0,
            fat: fat / energy * 100.0,
        }
    }
}
