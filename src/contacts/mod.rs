use crate::state::AppState;
use axum::Router;

pub mod birthdays;
mod dto;
mod handlers;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::contacts_routes())
        .merge(handlers::birthdays_routes())
}
