use serde::Deserialize;
use uuid::Uuid;

use crate::nutrition::Unit;

/// Exactly one of `food_id` and `recipe_id` must be set. The quantity is kept
/// raw here so that its validation reports a domain error.
#[derive(Debug, Deserialize)]
pub struct CreateMealItemRequest {
    pub food_id: Option<Uuid>,
    pub recipe_id: Option<Uuid>,
    pub quantity: f64,
    #[serde(default = "grams")]
    pub unit: Unit,
    pub observation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealItemRequest {
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    pub observation: Option<String>,
}

fn grams() -> Unit {
    Unit::G
}
