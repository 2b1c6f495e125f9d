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
    recipes::{
        dto::{CreateRecipeRequest, RecipeListParams, UpdateRecipeRequest},
        repo_types::Recipe,
        services,
    },
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<Recipe>), EngineError> {
    let recipe = services::create_recipe(state.store.as_ref(), user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<RecipeListParams>,
) -> Result<Json<Vec<Recipe>>, EngineError> {
    let recipes = services::list_recipes(state.store.as_ref(), &params.into_query(user_id)).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Recipe>, EngineError> {
    Ok(Json(services::get_recipe(state.store.as_ref(), user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Json<Recipe>, EngineError> {
    let recipe = services::update_recipe(state.store.as_ref(), user_id, id, payload).await?;
    Ok(Json(recipe))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, EngineError> {
    services::delete_recipe(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
