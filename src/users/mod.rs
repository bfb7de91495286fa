use crate::state::AppState;
use axum::Router;

pub mod dto;
mod handlers;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::users_routes()
}
