use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, instrument};

use crate::{auth::MessageResponse, state::AppState};

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Contacts API v1"))
}

/// Round-trips `SELECT 1` through the pool.
#[instrument(skip_all)]
pub async fn healthchecker(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(1) => Ok(Json(MessageResponse::new("Welcome to Contacts API!"))),
        Ok(other) => {
            error!(result = other, "unexpected health query result");
            Err(unhealthy())
        }
        Err(e) => {
            error!(error = %e, "database health check failed");
            Err(unhealthy())
        }
    }
}

fn unhealthy() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::new("Error connecting to the database")),
    )
}
