use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{EngineError, EntityKind};
use crate::nutrition::{Nutrients, Quantity, Unit};

/// What a meal item refers to: exactly one food or one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ItemSource {
    Food(Uuid),
    Recipe(Uuid),
}

impl ItemSource {
    /// Builds the source from the two optional request pointers.
    /// Neither and both are rejected.
    pub fn from_refs(food_id: Option<Uuid>, recipe_id: Option<Uuid>) -> Result<Self, EngineError> {
        match (food_id, recipe_id) {
            (Some(f), None) => Ok(ItemSource::Food(f)),
            (None, Some(r)) => Ok(ItemSource::Recipe(r)),
            (None, None) => Err(EngineError::InvalidReference(
                "either food_id or recipe_id must be provided",
            )),
            (Some(_), Some(_)) => Err(EngineError::InvalidReference(
                "food_id and recipe_id are mutually exclusive",
            )),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            ItemSource::Food(_) => EntityKind::Food,
            ItemSource::Recipe(_) => EntityKind::Recipe,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ItemSource::Food(id) | ItemSource::Recipe(id) => *id,
        }
    }

    pub fn food_id(&self) -> Option<Uuid> {
        match self {
            ItemSource::Food(id) => Some(*id),
            ItemSource::Recipe(_) => None,
        }
    }

    pub fn recipe_id(&self) -> Option<Uuid> {
        match self {
            ItemSource::Recipe(id) => Some(*id),
            ItemSource::Food(_) => None,
        }
    }
}

/// A food or recipe eaten in a meal, with its nutrition snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealItem {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub source: ItemSource,
    pub quantity: Quantity,
    pub unit: Unit,
    /// Frozen when the item is created or its amount changes.
    pub nutrition: Nutrients,
    pub observation: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct MealItemRow {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub food_id: Option<Uuid>,
    pub recipe_id: Option<Uuid>,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub observation: Option<String>,
}

impl TryFrom<MealItemRow> for MealItem {
    type Error = anyhow::Error;

    fn try_from(r: MealItemRow) -> Result<Self, Self::Error> {
        let source = ItemSource::from_refs(r.food_id, r.recipe_id)
            .with_context(|| format!("meal item {} has an invalid source", r.id))?;
        Ok(Self {
            id: r.id,
            meal_id: r.meal_id,
            source,
            quantity: Quantity::new(r.quantity)
                .with_context(|| format!("meal item {} quantity", r.id))?,
            unit: r.unit.parse()?,
            nutrition: Nutrients::new(r.calories, r.protein, r.carbs, r.fat, r.fiber),
            observation: r.observation,
        })
    }
}
