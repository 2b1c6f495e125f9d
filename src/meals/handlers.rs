use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::EngineError,
    meals::{
        dto::{CreateMealRequest, MealListParams, MealPage, UpdateMealRequest},
        repo_types::Meal,
        services,
    },
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal).put(update_meal).delete(delete_meal))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<MealListParams>,
) -> Result<Json<MealPage>, EngineError> {
    let page = services::list_meals(state.store.as_ref(), user_id, params).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Meal>, EngineError> {
    Ok(Json(services::get_meal(state.store.as_ref(), user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<Meal>), EngineError> {
    let meal = services::create_meal(state.store.as_ref(), user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealRequest>,
) -> Result<Json<Meal>, EngineError> {
    let meal = services::update_meal(state.store.as_ref(), user_id, id, payload).await?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, EngineError> {
    services::delete_meal(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
