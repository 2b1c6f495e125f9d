use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::EngineError,
    meal_items::{
        dto::{CreateMealItemRequest, UpdateMealItemRequest},
        repo_types::MealItem,
        services,
    },
    state::AppState,
};

pub fn meal_item_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/:id/items", get(list_items).post(create_item))
        .route(
            "/meal-items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<Uuid>,
    Json(payload): Json<CreateMealItemRequest>,
) -> Result<(StatusCode, Json<MealItem>), EngineError> {
    let item = services::create_meal_item(state.store.as_ref(), user_id, meal_id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<Uuid>,
) -> Result<Json<Vec<MealItem>>, EngineError> {
    let items = services::list_meal_items(state.store.as_ref(), user_id, meal_id).await?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealItem>, EngineError> {
    Ok(Json(services::get_meal_item(state.store.as_ref(), user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealItemRequest>,
) -> Result<Json<MealItem>, EngineError> {
    let item = services::update_meal_item(state.store.as_ref(), user_id, id, payload).await?;
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, EngineError> {
    services::delete_meal_item(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
