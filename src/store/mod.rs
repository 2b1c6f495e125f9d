//! Storage collaborator used by the engine.
//!
//! Lookups return `Ok(None)` for missing rows; mapping that to a domain
//! error is the caller's decision. Implementations must give
//! read-after-write consistency, and `save_goals` must apply its whole
//! batch atomically.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::foods::repo_types::{Food, FoodQuery};
use crate::goals::repo_types::Goal;
use crate::meal_items::repo_types::MealItem;
use crate::meals::repo_types::{Meal, MealQuery};
use crate::recipes::repo_types::{Recipe, RecipeQuery};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait FoodStore: Send + Sync {
    async fn food_by_id(&self, id: Uuid) -> anyhow::Result<Option<Food>>;
    async fn search_foods(&self, query: &FoodQuery) -> anyhow::Result<Vec<Food>>;
    async fn upsert_food(&self, food: Food) -> anyhow::Result<Food>;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn recipe_by_id(&self, id: Uuid) -> anyhow::Result<Option<Recipe>>;
    async fn list_recipes(&self, query: &RecipeQuery) -> anyhow::Result<Vec<Recipe>>;
    async fn upsert_recipe(&self, recipe: Recipe) -> anyhow::Result<Recipe>;
    async fn delete_recipe(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait MealStore: Send + Sync {
    async fn meal_by_id(&self, id: Uuid) -> anyhow::Result<Option<Meal>>;
    /// Meals of a user whose date falls in the inclusive range, ordered by date and time.
    async fn list_meals(&self, query: &MealQuery) -> anyhow::Result<Vec<Meal>>;
    async fn upsert_meal(&self, meal: Meal) -> anyhow::Result<Meal>;
    /// Removes the meal and its items.
    async fn delete_meal(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn meals_on(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<Meal>> {
        self.list_meals(&MealQuery::single_day(user_id, date)).await
    }
}

#[async_trait]
pub trait MealItemStore: Send + Sync {
    async fn meal_item_by_id(&self, id: Uuid) -> anyhow::Result<Option<MealItem>>;
    async fn list_meal_items(&self, meal_id: Uuid) -> anyhow::Result<Vec<MealItem>>;
    async fn upsert_meal_item(&self, item: MealItem) -> anyhow::Result<MealItem>;
    async fn delete_meal_item(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn goal_by_id(&self, id: Uuid) -> anyhow::Result<Option<Goal>>;
    async fn list_goals(&self, user_id: Uuid, active_only: bool) -> anyhow::Result<Vec<Goal>>;
    /// Upserts every goal in order, all or nothing.
    async fn save_goals(&self, goals: &[Goal]) -> anyhow::Result<()>;

    async fn upsert_goal(&self, goal: Goal) -> anyhow::Result<Goal> {
        self.save_goals(std::slice::from_ref(&goal)).await?;
        Ok(goal)
    }
}

pub trait Store: FoodStore + RecipeStore + MealStore + MealItemStore + GoalStore {}

impl<T> Store for T where T: FoodStore + RecipeStore + MealStore + MealItemStore + GoalStore {}
