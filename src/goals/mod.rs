pub mod dto;
pub mod handlers;
pub mod locks;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use locks::UserLocks;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::goal_routes()
}
