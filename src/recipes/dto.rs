use serde::Deserialize;
use uuid::Uuid;

use crate::recipes::repo_types::{Ingredient, RecipeQuery};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub servings: u32,
    pub prep_time_minutes: Option<u32>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub servings: Option<u32>,
    pub prep_time_minutes: Option<u32>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeListParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
}

impl RecipeListParams {
    pub fn into_query(self, user_id: Uuid) -> RecipeQuery {
        RecipeQuery {
            user_id: Some(user_id),
            category: self.category.filter(|c| !c.is_empty()),
            text: self.q.filter(|t| !t.trim().is_empty()),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }
}
