use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{Nutrients, Quantity, Unit};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub food_id: Uuid,
    pub quantity: Quantity,
    pub unit: Unit,
}

/// Derived nutrition of a recipe. `per_serving` is always `totals / servings`
/// for the ingredient list and serving count it was computed from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipeNutrition {
    pub totals: Nutrients,
    pub per_serving: Nutrients,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub servings: u32,
    pub prep_time_minutes: Option<u32>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Option<String>,
    #[serde(flatten)]
    pub nutrition: RecipeNutrition,
    pub is_public: bool,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Recipe {
    pub fn visible_to(&self, user_id: Uuid) -> bool {
        self.is_public || self.user_id == user_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    /// Owner whose private recipes are included alongside public ones.
    pub user_id: Option<Uuid>,
    pub category: Option<String>,
    pub text: Option<String>,
    pub limit: usize,
}

impl RecipeQuery {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let visible = match self.user_id {
            Some(uid) => recipe.visible_to(uid),
            None => recipe.is_public,
        };
        if !visible {
            return false;
        }
        if let Some(category) = &self.category {
            if &recipe.category != category {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !recipe.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, FromRow)]
pub struct RecipeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub servings: i32,
    pub prep_time_minutes: Option<i32>,
    pub ingredients: Json<Vec<Ingredient>>,
    pub instructions: Option<String>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_fiber: f64,
    pub serving_calories: f64,
    pub serving_protein: f64,
    pub serving_carbs: f64,
    pub serving_fat: f64,
    pub serving_fiber: f64,
    pub is_public: bool,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = anyhow::Error;

    fn try_from(r: RecipeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            description: r.description,
            category: r.category,
            servings: u32::try_from(r.servings).context("recipe servings out of range")?,
            prep_time_minutes: r
                .prep_time_minutes
                .map(u32::try_from)
                .transpose()
                .context("recipe prep time out of range")?,
            ingredients: r.ingredients.0,
            instructions: r.instructions,
            nutrition: RecipeNutrition {
                totals: Nutrients::new(
                    r.total_calories,
                    r.total_protein,
                    r.total_carbs,
                    r.total_fat,
                    r.total_fiber,
                ),
                per_serving: Nutrients::new(
                    r.serving_calories,
                    r.serving_protein,
                    r.serving_carbs,
                    r.serving_fat,
                    r.serving_fiber,
                ),
            },
            is_public: r.is_public,
            tags: r.tags,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
