use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Meal, MealQuery};

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Meal>> {
    let meal = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, user_id, name, meal_date, meal_time, description, location, tags,
               registered_at
          FROM meals
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("select meal")?;
    Ok(meal)
}

pub async fn list(db: &PgPool, q: &MealQuery) -> anyhow::Result<Vec<Meal>> {
    let (offset, limit) = match q.page {
        Some((offset, limit)) => (offset as i64, Some(limit as i64)),
        None => (0, None),
    };

    let rows = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, user_id, name, meal_date, meal_time, description, location, tags,
               registered_at
          FROM meals
         WHERE user_id = $1
           AND ($2::date IS NULL OR meal_date >= $2)
           AND ($3::date IS NULL OR meal_date <= $3)
         ORDER BY meal_date ASC, meal_time ASC, registered_at ASC
         LIMIT $4 OFFSET $5
        "#,
    )
    .bind(q.user_id)
    .bind(q.start)
    .bind(q.end)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list meals")?;
    Ok(rows)
}

pub async fn upsert(db: &PgPool, m: &Meal) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO meals (id, user_id, name, meal_date, meal_time, description, location,
                           tags, registered_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            meal_date = EXCLUDED.meal_date,
            meal_time = EXCLUDED.meal_time,
            description = EXCLUDED.description,
            location = EXCLUDED.location,
            tags = EXCLUDED.tags
        "#,
    )
    .bind(m.id)
    .bind(m.user_id)
    .bind(&m.name)
    .bind(m.meal_date)
    .bind(m.meal_time)
    .bind(&m.description)
    .bind(&m.location)
    .bind(&m.tags)
    .bind(m.registered_at)
    .execute(db)
    .await
    .with_context(|| format!("upsert meal {}", m.id))?;
    Ok(())
}

/// Meal items go with the meal (`ON DELETE CASCADE`).
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(res.rows_affected() > 0)
}
