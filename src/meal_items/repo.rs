use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{MealItem, MealItemRow};

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MealItem>> {
    let row = sqlx::query_as::<_, MealItemRow>(
        r#"
        SELECT id, meal_id, food_id, recipe_id, quantity, unit,
               calories, protein, carbs, fat, fiber, observation
          FROM meal_items
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("select meal item")?;

    row.map(MealItem::try_from).transpose()
}

pub async fn list_by_meal(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Vec<MealItem>> {
    let rows = sqlx::query_as::<_, MealItemRow>(
        r#"
        SELECT id, meal_id, food_id, recipe_id, quantity, unit,
               calories, protein, carbs, fat, fiber, observation
          FROM meal_items
         WHERE meal_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(meal_id)
    .fetch_all(db)
    .await
    .context("list meal items")?;

    rows.into_iter().map(MealItem::try_from).collect()
}

pub async fn upsert(db: &PgPool, item: &MealItem) -> anyhow::Result<()> {
    let n = item.nutrition;
    sqlx::query(
        r#"
        INSERT INTO meal_items (id, meal_id, food_id, recipe_id, quantity, unit,
                                calories, protein, carbs, fat, fiber, observation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO UPDATE SET
            quantity = EXCLUDED.quantity,
            unit = EXCLUDED.unit,
            calories = EXCLUDED.calories,
            protein = EXCLUDED.protein,
            carbs = EXCLUDED.carbs,
            fat = EXCLUDED.fat,
            fiber = EXCLUDED.fiber,
            observation = EXCLUDED.observation
        "#,
    )
    .bind(item.id)
    .bind(item.meal_id)
    .bind(item.source.food_id())
    .bind(item.source.recipe_id())
    .bind(item.quantity.get())
    .bind(item.unit.as_str())
    .bind(n.calories)
    .bind(n.protein)
    .bind(n.carbs)
    .bind(n.fat)
    .bind(n.fiber)
    .bind(&item.observation)
    .execute(db)
    .await
    .with_context(|| format!("upsert meal item {}", item.id))?;
    Ok(())
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_items WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete meal item")?;
    Ok(res.rows_affected() > 0)
}
