use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{Recipe, RecipeQuery, RecipeRow};

const RECIPE_COLUMNS: &str = r#"
    id, user_id, name, description, category, servings, prep_time_minutes, ingredients,
    instructions, total_calories, total_protein, total_carbs, total_fat, total_fiber,
    serving_calories, serving_protein, serving_carbs, serving_fat, serving_fiber,
    is_public, tags, created_at, updated_at
"#;

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("select recipe")?;

    row.map(Recipe::try_from).transpose()
}

pub async fn list(db: &PgPool, q: &RecipeQuery) -> anyhow::Result<Vec<Recipe>> {
    let pattern = q.text.as_ref().map(|t| format!("%{}%", t));

    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        r#"
        SELECT {RECIPE_COLUMNS}
          FROM recipes
         WHERE (is_public OR user_id = $1)
           AND ($2::text IS NULL OR category = $2)
           AND ($3::text IS NULL OR name ILIKE $3)
         ORDER BY created_at ASC
         LIMIT $4
        "#
    ))
    .bind(q.user_id)
    .bind(q.category.as_deref())
    .bind(pattern)
    .bind(q.limit as i64)
    .fetch_all(db)
    .await
    .context("list recipes")?;

    rows.into_iter().map(Recipe::try_from).collect()
}

pub async fn upsert(db: &PgPool, r: &Recipe) -> anyhow::Result<()> {
    let servings = i32::try_from(r.servings).context("servings out of range")?;
    let prep_time = r
        .prep_time_minutes
        .map(i32::try_from)
        .transpose()
        .context("prep time out of range")?;
    let totals = r.nutrition.totals;
    let per_serving = r.nutrition.per_serving;

    sqlx::query(
        r#"
        INSERT INTO recipes (id, user_id, name, description, category, servings,
                             prep_time_minutes, ingredients, instructions,
                             total_calories, total_protein, total_carbs, total_fat, total_fiber,
                             serving_calories, serving_protein, serving_carbs, serving_fat,
                             serving_fiber, is_public, tags, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            category = EXCLUDED.category,
            servings = EXCLUDED.servings,
            prep_time_minutes = EXCLUDED.prep_time_minutes,
            ingredients = EXCLUDED.ingredients,
            instructions = EXCLUDED.instructions,
            total_calories = EXCLUDED.total_calories,
            total_protein = EXCLUDED.total_protein,
            total_carbs = EXCLUDED.total_carbs,
            total_fat = EXCLUDED.total_fat,
            total_fiber = EXCLUDED.total_fiber,
            serving_calories = EXCLUDED.serving_calories,
            serving_protein = EXCLUDED.serving_protein,
            serving_carbs = EXCLUDED.serving_carbs,
            serving_fat = EXCLUDED.serving_fat,
            serving_fiber = EXCLUDED.serving_fiber,
            is_public = EXCLUDED.is_public,
            tags = EXCLUDED.tags,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(r.id)
    .bind(r.user_id)
    .bind(&r.name)
    .bind(&r.description)
    .bind(&r.category)
    .bind(servings)
    .bind(prep_time)
    .bind(Json(&r.ingredients))
    .bind(&r.instructions)
    .bind(totals.calories)
    .bind(totals.protein)
    .bind(totals.carbs)
    .bind(totals.fat)
    .bind(totals.fiber)
    .bind(per_serving.calories)
    .bind(per_serving.protein)
    .bind(per_serving.carbs)
    .bind(per_serving.fat)
    .bind(per_serving.fiber)
    .bind(r.is_public)
    .bind(&r.tags)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(db)
    .await
    .with_context(|| format!("upsert recipe {}", r.id))?;

    Ok(())
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete recipe")?;
    Ok(res.rows_affected() > 0)
}
