use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{Food, FoodQuery, FoodRow};

const FOOD_COLUMNS: &str = r#"
    id, name, main_category, subcategory, calories, protein, carbs, fat, fiber,
    micronutrients, data_source, standard_portion, standard_portion_unit,
    conversion_factors, creator_user_id, is_public, tags
"#;

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Food>> {
    let row = sqlx::query_as::<_, FoodRow>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("select food")?;

    row.map(Food::try_from).transpose()
}

pub async fn search(db: &PgPool, q: &FoodQuery) -> anyhow::Result<Vec<Food>> {
    let pattern = q.text.as_ref().map(|t| format!("%{}%", t));
    let tags: Vec<String> = q.tags.iter().map(|t| t.to_lowercase()).collect();

    let rows = sqlx::query_as::<_, FoodRow>(&format!(
        r#"
        SELECT {FOOD_COLUMNS}
          FROM foods
         WHERE is_public
           AND ($1::text IS NULL OR name ILIKE $1)
           AND ($2::text IS NULL OR main_category = $2)
           AND (cardinality($3::text[]) = 0
                OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE lower(t) = ANY($3)))
         ORDER BY name ASC
         LIMIT $4
        "#
    ))
    .bind(pattern)
    .bind(q.category.as_deref())
    .bind(&tags)
    .bind(q.limit as i64)
    .fetch_all(db)
    .await
    .context("search foods")?;

    rows.into_iter().map(Food::try_from).collect()
}

/// Reference data is normally loaded out-of-band; this backs the seed loader.
pub async fn upsert(db: &PgPool, food: &Food) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO foods (id, name, main_category, subcategory, calories, protein, carbs, fat,
                           fiber, micronutrients, data_source, standard_portion,
                           standard_portion_unit, conversion_factors, creator_user_id,
                           is_public, tags)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            main_category = EXCLUDED.main_category,
            subcategory = EXCLUDED.subcategory,
            calories = EXCLUDED.calories,
            protein = EXCLUDED.protein,
            carbs = EXCLUDED.carbs,
            fat = EXCLUDED.fat,
            fiber = EXCLUDED.fiber,
            micronutrients = EXCLUDED.micronutrients,
            data_source = EXCLUDED.data_source,
            standard_portion = EXCLUDED.standard_portion,
            standard_portion_unit = EXCLUDED.standard_portion_unit,
            conversion_factors = EXCLUDED.conversion_factors,
            creator_user_id = EXCLUDED.creator_user_id,
            is_public = EXCLUDED.is_public,
            tags = EXCLUDED.tags,
            updated_at = now()
        "#,
    )
    .bind(food.id)
    .bind(&food.name)
    .bind(&food.main_category)
    .bind(&food.subcategory)
    .bind(food.nutrients.calories)
    .bind(food.nutrients.protein)
    .bind(food.nutrients.carbs)
    .bind(food.nutrients.fat)
    .bind(food.nutrients.fiber)
    .bind(Json(&food.micronutrients))
    .bind(&food.data_source)
    .bind(food.standard_portion)
    .bind(food.standard_portion_unit.as_str())
    .bind(Json(&food.conversion_factors))
    .bind(food.creator_user_id)
    .bind(food.is_public)
    .bind(&food.tags)
    .execute(db)
    .await
    .with_context(|| format!("upsert food {}", food.id))?;

    Ok(())
}
