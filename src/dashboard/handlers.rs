use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    dashboard::{
        dto::{DashboardParams, DashboardReport},
        services,
    },
    error::EngineError,
    state::AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardReport>, EngineError> {
    let report = services::daily_report(state.store.as_ref(), user_id, params.date).await?;
    Ok(Json(report))
}
