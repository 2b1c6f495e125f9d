use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{EngineError, EntityKind};
use crate::meals::dto::{CreateMealRequest, MealListParams, MealPage, UpdateMealRequest, MAX_LIMIT};
use crate::meals::repo_types::{Meal, MealQuery};
use crate::store::{MealStore, Store};
use crate::validation;

const NAME_MAX_LEN: usize = 100;

/// A meal owned by `user_id`. Other users' meals read as missing.
pub async fn owned_meal(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Option<Meal>, EngineError> {
    Ok(store.meal_by_id(id).await?.filter(|m| m.user_id == user_id))
}

#[instrument(skip(store, req))]
pub async fn create_meal(
    store: &dyn Store,
    user_id: Uuid,
    req: CreateMealRequest,
) -> Result<Meal, EngineError> {
    let meal = Meal {
        id: Uuid::new_v4(),
        user_id,
        name: validation::name("meal name", &req.name, NAME_MAX_LEN)?,
        meal_date: req.meal_date,
        meal_time: req.meal_time,
        description: validation::optional_text(req.description),
        location: validation::optional_text(req.location),
        tags: req.tags,
        registered_at: OffsetDateTime::now_utc(),
    };
    let meal = store.upsert_meal(meal).await?;
    info!(meal_id = %meal.id, date = %meal.meal_date, "meal created");
    Ok(meal)
}

#[instrument(skip(store))]
pub async fn get_meal(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Meal, EngineError> {
    owned_meal(store, user_id, id)
        .await?
        .ok_or(EngineError::not_found(EntityKind::Meal, id))
}

#[instrument(skip(store, req))]
pub async fn update_meal(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
    req: UpdateMealRequest,
) -> Result<Meal, EngineError> {
    let mut meal = get_meal(store, user_id, id).await?;
    if let Some(name) = req.name {
        meal.name = validation::name("meal name", &name, NAME_MAX_LEN)?;
    }
    if let Some(date) = req.meal_date {
        meal.meal_date = date;
    }
    if let Some(time) = req.meal_time {
        meal.meal_time = time;
    }
    if let Some(description) = req.description {
        meal.description = validation::optional_text(Some(description));
    }
    if let Some(location) = req.location {
        meal.location = validation::optional_text(Some(location));
    }
    if let Some(tags) = req.tags {
        meal.tags = tags;
    }
    Ok(store.upsert_meal(meal).await?)
}

/// Deletes the meal together with its items.
#[instrument(skip(store))]
pub async fn delete_meal(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), EngineError> {
    get_meal(store, user_id, id).await?;
    store.delete_meal(id).await?;
    info!(meal_id = %id, "meal deleted");
    Ok(())
}

#[instrument(skip(store))]
pub async fn list_meals(
    store: &dyn Store,
    user_id: Uuid,
    params: MealListParams,
) -> Result<MealPage, EngineError> {
    if params.page == 0 {
        return Err(EngineError::Validation("page starts at 1".into()));
    }
    if params.limit == 0 || params.limit > MAX_LIMIT {
        return Err(EngineError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    // the offset is bound as a Postgres BIGINT
    let offset = (params.page - 1)
        .checked_mul(params.limit)
        .filter(|o| i64::try_from(*o).is_ok())
        .ok_or_else(|| EngineError::Validation("page is out of range".into()))?;
    if let (Some(start), Some(end)) = (params.start_date, params.end_date) {
        if end < start {
            return Err(EngineError::Validation(
                "end_date must not be before start_date".into(),
            ));
        }
    }

    let query = MealQuery {
        user_id,
        start: params.start_date,
        end: params.end_date,
        page: Some((offset, params.limit)),
    };
    let meals = store.list_meals(&query).await?;
    Ok(MealPage {
        meals,
        page: params.page,
        limit: params.limit,
    })
}
