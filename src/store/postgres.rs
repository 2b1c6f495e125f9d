use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{FoodStore, GoalStore, MealItemStore, MealStore, RecipeStore};
use crate::foods::{self, repo_types::{Food, FoodQuery}};
use crate::goals::{self, repo_types::Goal};
use crate::meal_items::{self, repo_types::MealItem};
use crate::meals::{self, repo_types::{Meal, MealQuery}};
use crate::recipes::{self, repo_types::{Recipe, RecipeQuery}};

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl FoodStore for PgStore {
    async fn food_by_id(&self, id: Uuid) -> anyhow::Result<Option<Food>> {
        foods::repo::find_by_id(&self.db, id).await
    }

    async fn search_foods(&self, query: &FoodQuery) -> anyhow::Result<Vec<Food>> {
        foods::repo::search(&self.db, query).await
    }

    async fn upsert_food(&self, food: Food) -> anyhow::Result<Food> {
        foods::repo::upsert(&self.db, &food).await?;
        Ok(food)
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn recipe_by_id(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        recipes::repo::find_by_id(&self.db, id).await
    }

    async fn list_recipes(&self, query: &RecipeQuery) -> anyhow::Result<Vec<Recipe>> {
        recipes::repo::list(&self.db, query).await
    }

    async fn upsert_recipe(&self, recipe: Recipe) -> anyhow::Result<Recipe> {
        recipes::repo::upsert(&self.db, &recipe).await?;
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: Uuid) -> anyhow::Result<bool> {
        recipes::repo::delete(&self.db, id).await
    }
}

#[async_trait]
impl MealStore for PgStore {
    async fn meal_by_id(&self, id: Uuid) -> anyhow::Result<Option<Meal>> {
        meals::repo::find_by_id(&self.db, id).await
    }

    async fn list_meals(&self, query: &MealQuery) -> anyhow::Result<Vec<Meal>> {
        meals::repo::list(&self.db, query).await
    }

    async fn upsert_meal(&self, meal: Meal) -> anyhow::Result<Meal> {
        meals::repo::upsert(&self.db, &meal).await?;
        Ok(meal)
    }

    async fn delete_meal(&self, id: Uuid) -> anyhow::Result<bool> {
        meals::repo::delete(&self.db, id).await
    }
}

#[async_trait]
impl MealItemStore for PgStore {
    async fn meal_item_by_id(&self, id: Uuid) -> anyhow::Result<Option<MealItem>> {
        meal_items::repo::find_by_id(&self.db, id).await
    }

    async fn list_meal_items(&self, meal_id: Uuid) -> anyhow::Result<Vec<MealItem>> {
        meal_items::repo::list_by_meal(&self.db, meal_id).await
    }

    async fn upsert_meal_item(&self, item: MealItem) -> anyhow::Result<MealItem> {
        meal_items::repo::upsert(&self.db, &item).await?;
        Ok(item)
    }

    async fn delete_meal_item(&self, id: Uuid) -> anyhow::Result<bool> {
        meal_items::repo::delete(&self.db, id).await
    }
}

#[async_trait]
impl GoalStore for PgStore {
    async fn goal_by_id(&self, id: Uuid) -> anyhow::Result<Option<Goal>> {
        goals::repo::find_by_id(&self.db, id).await
    }

    async fn list_goals(&self, user_id: Uuid, active_only: bool) -> anyhow::Result<Vec<Goal>> {
        goals::repo::list_by_user(&self.db, user_id, active_only).await
    }

    async fn save_goals(&self, goals: &[Goal]) -> anyhow::Result<()> {
        goals::repo::save_all(&self.db, goals).await
    }
}
