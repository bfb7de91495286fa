use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, patch},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{dto::UserResponse, repo_types::User};
use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
    storage::ext_from_mime,
};

const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(read_me))
        .route(
            "/users/avatar",
            patch(update_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024)),
        )
}

#[instrument(skip_all)]
pub async fn read_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

/// PATCH /users/avatar (multipart, field `file`)
#[instrument(skip_all)]
pub async fn update_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut mp: Multipart,
) -> ApiResult<Json<UserResponse>> {
    let mut upload: Option<(Bytes, String)> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            upload = Some((data, content_type));
            break;
        }
    }

    let (data, content_type) =
        upload.ok_or_else(|| ApiError::validation("file", "file is required"))?;
    let ext = ext_from_mime(&content_type)
        .ok_or_else(|| ApiError::validation("file", "unsupported image type"))?;
    if data.is_empty() || data.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::validation("file", "image must be between 1 byte and 5 MB"));
    }

    let key = avatar_key(user.id, Uuid::new_v4(), ext);
    state.storage.put_object(&key, data, &content_type).await?;
    let url = state.storage.public_url(&key);

    let updated = User::set_avatar(&state.db, &user.email, &url)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    info!(user_id = updated.id, %url, "avatar updated");
    Ok(Json(updated.into()))
}

fn avatar_key(user_id: i32, object_id: Uuid, ext: &str) -> String {
    format!("avatars/{}/{}.{}", user_id, object_id, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_key_is_scoped_by_user() {
        let id = Uuid::nil();
        assert_eq!(
            avatar_key(42, id, "png"),
            "avatars/42/00000000-0000-0000-0000-000000000000.png"
        );
    }
}
