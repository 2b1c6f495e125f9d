use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FoodStore, GoalStore, MealItemStore, MealStore, RecipeStore};
use crate::foods::repo_types::{Food, FoodQuery};
use crate::goals::repo_types::Goal;
use crate::meal_items::repo_types::MealItem;
use crate::meals::repo_types::{Meal, MealQuery};
use crate::recipes::repo_types::{Recipe, RecipeQuery};

#[derive(Default)]
struct Tables {
    foods: Vec<Food>,
    recipes: Vec<Recipe>,
    meals: Vec<Meal>,
    meal_items: Vec<MealItem>,
    goals: Vec<Goal>,
}

/// Volatile store kept in process memory; rows keep insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_foods(foods: Vec<Food>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                foods,
                ..Tables::default()
            }),
        }
    }
}

fn upsert_by_id<T>(rows: &mut Vec<T>, row: T, id_of: impl Fn(&T) -> Uuid) {
    let id = id_of(&row);
    match rows.iter_mut().find(|r| id_of(r) == id) {
        Some(slot) => *slot = row,
        None => rows.push(row),
    }
}

fn remove_by_id<T>(rows: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> bool {
    let before = rows.len();
    rows.retain(|r| id_of(r) != id);
    rows.len() != before
}

#[async_trait]
impl FoodStore for InMemoryStore {
    async fn food_by_id(&self, id: Uuid) -> anyhow::Result<Option<Food>> {
        let t = self.tables.read().await;
        Ok(t.foods.iter().find(|f| f.id == id).cloned())
    }

    async fn search_foods(&self, query: &FoodQuery) -> anyhow::Result<Vec<Food>> {
        let t = self.tables.read().await;
        Ok(t.foods
            .iter()
            .filter(|f| query.matches(f))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn upsert_food(&self, food: Food) -> anyhow::Result<Food> {
        let mut t = self.tables.write().await;
        upsert_by_id(&mut t.foods, food.clone(), |f| f.id);
        Ok(food)
    }
}

#[async_trait]
impl RecipeStore for InMemoryStore {
    async fn recipe_by_id(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let t = self.tables.read().await;
        Ok(t.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn list_recipes(&self, query: &RecipeQuery) -> anyhow::Result<Vec<Recipe>> {
        let t = self.tables.read().await;
        Ok(t.recipes
            .iter()
            .filter(|r| query.matches(r))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn upsert_recipe(&self, recipe: Recipe) -> anyhow::Result<Recipe> {
        let mut t = self.tables.write().await;
        upsert_by_id(&mut t.recipes, recipe.clone(), |r| r.id);
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        Ok(remove_by_id(&mut t.recipes, id, |r| r.id))
    }
}

#[async_trait]
impl MealStore for InMemoryStore {
    async fn meal_by_id(&self, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let t = self.tables.read().await;
        Ok(t.meals.iter().find(|m| m.id == id).cloned())
    }

    async fn list_meals(&self, query: &MealQuery) -> anyhow::Result<Vec<Meal>> {
        let t = self.tables.read().await;
        let mut meals: Vec<Meal> = t.meals.iter().filter(|m| query.matches(m)).cloned().collect();
        meals.sort_by_key(|m| (m.meal_date, m.meal_time, m.registered_at));
        Ok(match query.page {
            Some((offset, limit)) => meals.into_iter().skip(offset).take(limit).collect(),
            None => meals,
        })
    }

    async fn upsert_meal(&self, meal: Meal) -> anyhow::Result<Meal> {
        let mut t = self.tables.write().await;
        upsert_by_id(&mut t.meals, meal.clone(), |m| m.id);
        Ok(meal)
    }

    async fn delete_meal(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let removed = remove_by_id(&mut t.meals, id, |m| m.id);
        if removed {
            t.meal_items.retain(|i| i.meal_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MealItemStore for InMemoryStore {
    async fn meal_item_by_id(&self, id: Uuid) -> anyhow::Result<Option<MealItem>> {
        let t = self.tables.read().await;
        Ok(t.meal_items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_meal_items(&self, meal_id: Uuid) -> anyhow::Result<Vec<MealItem>> {
        let t = self.tables.read().await;
        Ok(t.meal_items
            .iter()
            .filter(|i| i.meal_id == meal_id)
            .cloned()
            .collect())
    }

    async fn upsert_meal_item(&self, item: MealItem) -> anyhow::Result<MealItem> {
        let mut t = self.tables.write().await;
        upsert_by_id(&mut t.meal_items, item.clone(), |i| i.id);
        Ok(item)
    }

    async fn delete_meal_item(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        Ok(remove_by_id(&mut t.meal_items, id, |i| i.id))
    }
}

#[async_trait]
impl GoalStore for InMemoryStore {
    async fn goal_by_id(&self, id: Uuid) -> anyhow::Result<Option<Goal>> {
        let t = self.tables.read().await;
        Ok(t.goals.iter().find(|g| g.id == id).cloned())
    }

    async fn list_goals(&self, user_id: Uuid, active_only: bool) -> anyhow::Result<Vec<Goal>> {
        let t = self.tables.read().await;
        Ok(t.goals
            .iter()
            .filter(|g| g.user_id == user_id && (!active_only || g.active))
            .cloned()
            .collect())
    }

    async fn save_goals(&self, goals: &[Goal]) -> anyhow::Result<()> {
        let mut t = self.tables.write().await;
        for g in goals {
            upsert_by_id(&mut t.goals, g.clone(), |g| g.id);
        }
        Ok(())
    }
}
