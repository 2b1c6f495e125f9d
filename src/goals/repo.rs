use anyhow::Context;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{Goal, GoalRow};

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Goal>> {
    let row = sqlx::query_as::<_, GoalRow>(
        r#"
        SELECT id, user_id, name, start_date, end_date, calories_target, protein_target,
               carbs_target, fat_target, fiber_target, macro_type, active, notes
          FROM goals
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("select goal")?;

    row.map(Goal::try_from).transpose()
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    active_only: bool,
) -> anyhow::Result<Vec<Goal>> {
    let rows = sqlx::query_as::<_, GoalRow>(
        r#"
        SELECT id, user_id, name, start_date, end_date, calories_target, protein_target,
               carbs_target, fat_target, fiber_target, macro_type, active, notes
          FROM goals
         WHERE user_id = $1
           AND (NOT $2 OR active)
         ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(active_only)
    .fetch_all(db)
    .await
    .context("list goals")?;

    rows.into_iter().map(Goal::try_from).collect()
}

async fn upsert<'e>(exec: impl PgExecutor<'e>, g: &Goal) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO goals (id, user_id, name, start_date, end_date, calories_target,
                           protein_target, carbs_target, fat_target, fiber_target,
                           macro_type, active, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            start_date = EXCLUDED.start_date,
            end_date = EXCLUDED.end_date,
            calories_target = EXCLUDED.calories_target,
            protein_target = EXCLUDED.protein_target,
            carbs_target = EXCLUDED.carbs_target,
            fat_target = EXCLUDED.fat_target,
            fiber_target = EXCLUDED.fiber_target,
            macro_type = EXCLUDED.macro_type,
            active = EXCLUDED.active,
            notes = EXCLUDED.notes
        "#,
    )
    .bind(g.id)
    .bind(g.user_id)
    .bind(&g.name)
    .bind(g.start_date)
    .bind(g.end_date)
    .bind(g.calories_target)
    .bind(g.protein_target)
    .bind(g.carbs_target)
    .bind(g.fat_target)
    .bind(g.fiber_target)
    .bind(g.macro_type.as_str())
    .bind(g.active)
    .bind(&g.notes)
    .execute(exec)
    .await
    .with_context(|| format!("upsert goal {}", g.id))?;
    Ok(())
}

/// Writes the batch inside one transaction. The partial unique index on
/// `(user_id) WHERE active` rejects a batch that would leave two goals active.
pub async fn save_all(db: &PgPool, goals: &[Goal]) -> anyhow::Result<()> {
    let mut tx: Transaction<'_, Postgres> = db.begin().await.context("begin tx")?;
    for g in goals {
        upsert(&mut *tx, g).await?;
    }
    tx.commit().await.context("commit tx")?;
    Ok(())
}
