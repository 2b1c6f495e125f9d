use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::nutrition::{Nutrients, Unit};

/// Reference food. Nutrients are per 100 g (or gram-equivalent).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub main_category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(flatten)]
    pub nutrients: Nutrients,
    /// Vitamins and minerals keyed by name, same reference amount as `nutrients`.
    #[serde(default)]
    pub micronutrients: BTreeMap<String, f64>,
    #[serde(default)]
    pub data_source: Option<String>,
    pub standard_portion: f64,
    pub standard_portion_unit: Unit,
    /// Gram-equivalents of one of each alternate unit.
    #[serde(default)]
    pub conversion_factors: BTreeMap<Unit, f64>,
    #[serde(default)]
    pub creator_user_id: Option<Uuid>,
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Food {
    pub fn visible_to(&self, user_id: Uuid) -> bool {
        self.is_public || self.creator_user_id == Some(user_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FoodQuery {
    pub text: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub limit: usize,
}

impl FoodQuery {
    pub fn matches(&self, food: &Food) -> bool {
        if !food.is_public {
            return false;
        }
        if let Some(text) = &self.text {
            if !food.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &food.main_category != category {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let hit = food
                .tags
                .iter()
                .any(|t| self.tags.iter().any(|q| q.eq_ignore_ascii_case(t)));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, FromRow)]
pub struct FoodRow {
    pub id: Uuid,
    pub name: String,
    pub main_category: String,
    pub subcategory: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub micronutrients: Json<BTreeMap<String, f64>>,
    pub data_source: Option<String>,
    pub standard_portion: f64,
    pub standard_portion_unit: String,
    pub conversion_factors: Json<BTreeMap<Unit, f64>>,
    pub creator_user_id: Option<Uuid>,
    pub is_public: bool,
    pub tags: Vec<String>,
}

impl TryFrom<FoodRow> for Food {
    type Error = anyhow::Error;

    fn try_from(r: FoodRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            main_category: r.main_category,
            subcategory: r.subcategory,
            nutrients: Nutrients::new(r.calories, r.protein, r.carbs, r.fat, r.fiber),
            micronutrients: r.micronutrients.0,
            data_source: r.data_source,
            standard_portion: r.standard_portion,
            standard_portion_unit: r.standard_portion_unit.parse()?,
            conversion_factors: r.conversion_factors.0,
            creator_user_id: r.creator_user_id,
            is_public: r.is_public,
            tags: r.tags,
        })
    }
}
