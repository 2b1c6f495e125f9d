use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::EngineError,
    foods::{dto::FoodSearchParams, repo_types::Food, services},
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(search_foods))
        .route("/foods/:id", get(get_food))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<FoodSearchParams>,
) -> Result<Json<Vec<Food>>, EngineError> {
    let foods = services::search_foods(state.store.as_ref(), &params.into()).await?;
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Food>, EngineError> {
    let food = services::get_food(state.store.as_ref(), user_id, id).await?;
    Ok(Json(food))
}
