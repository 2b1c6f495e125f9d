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
    goals::{
        dto::{CreateGoalRequest, GoalListParams, UpdateGoalRequest},
        repo_types::Goal,
        services,
    },
    state::AppState,
};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/:id", get(get_goal).put(update_goal))
}

#[instrument(skip(state, payload))]
pub async fn create_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), EngineError> {
    let goal =
        services::create_goal(state.store.as_ref(), &state.goal_locks, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

#[instrument(skip(state))]
pub async fn list_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<GoalListParams>,
) -> Result<Json<Vec<Goal>>, EngineError> {
    let goals = services::list_goals(state.store.as_ref(), user_id, params.active_only).await?;
    Ok(Json(goals))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Goal>, EngineError> {
    Ok(Json(services::get_goal(state.store.as_ref(), user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGoalRequest>,
) -> Result<Json<Goal>, EngineError> {
    let goal =
        services::update_goal(state.store.as_ref(), &state.goal_locks, user_id, id, payload)
            .await?;
    Ok(Json(goal))
}
