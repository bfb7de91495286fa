use axum::{
    extract::{FromRef, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    claims::TokenKind,
    dto::{LoginRequest, MessageResponse, RequestEmail, SignupRequest, SignupResponse, TokenResponse},
    extractors::{bearer_token, CurrentUser},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    mailer::confirmation_link,
    state::AppState,
    users::repo_types::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh_token", get(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/confirmed_email/:token", get(confirmed_email))
        .route("/auth/request_email", post(request_email))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Signs a confirmation token and hands the link to the mailer in the background.
fn send_confirmation(state: &AppState, user: &User) -> ApiResult<()> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign_email_confirm(user.id, &user.email)?;
    let link = confirmation_link(&state.config.public_base_url, &token);

    let mailer = state.mailer.clone();
    let (email, username) = (user.email.clone(), user.username.clone());
    tokio::spawn(async move {
        if let Err(e) = mailer.send_confirmation(&email, &username, &link).await {
            error!(error = %e, %email, "sending confirmation email failed");
        }
    });
    Ok(())
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<(String, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id, &user.email)?;
    let refresh_token = keys.sign_refresh(user.id, &user.email)?;
    Ok((access_token, refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let email = normalize_email(&payload.email);

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("Account already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &email, &hash).await?;
    send_confirmation(&state, &user)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.into(),
            detail: "User successfully created. Check your email for confirmation.".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let email = normalize_email(&payload.email);

    let user = User::find_by_email(&state.db, &email).await?.ok_or_else(|| {
        warn!(%email, "login unknown email");
        ApiError::unauthorized("Invalid credentials")
    })?;

    if !verify_password(&payload.password, &user.password)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !user.confirmed {
        warn!(user_id = user.id, "login with unconfirmed email");
        return Err(ApiError::unauthorized("Email not confirmed"));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;
    User::set_refresh_token(&state.db, user.id, Some(&refresh_token)).await?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}

/// GET /auth/refresh_token with `Authorization: Bearer <refresh token>`.
/// A token that is valid but no longer the stored one revokes the stored token.
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<TokenResponse>> {
    let token = bearer_token(&headers)?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_kind(token, TokenKind::Refresh).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        ApiError::unauthorized("Invalid refresh token")
    })?;

    let user = User::find_by_email(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    if user.refresh_token.as_deref() != Some(token) {
        User::set_refresh_token(&state.db, user.id, None).await?;
        warn!(user_id = user.id, "stale refresh token presented; stored token revoked");
        return Err(ApiError::unauthorized("Invalid refresh token"));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;
    User::set_refresh_token(&state.db, user.id, Some(&refresh_token)).await?;

    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StatusCode> {
    User::set_refresh_token(&state.db, user.id, None).await?;
    info!("user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_kind(&token, TokenKind::EmailConfirm)
        .map_err(|e| {
            warn!(error = %e, "confirmation token rejected");
            ApiError::BadRequest("Verification error".into())
        })?;

    let user = User::find_by_email(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Verification error".into()))?;
    if user.confirmed {
        return Ok(Json(MessageResponse::new("Your email is already confirmed")));
    }

    User::confirm_email(&state.db, &user.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Verification error".into()))?;
    info!(user_id = user.id, "email confirmed");
    Ok(Json(MessageResponse::new("Email confirmed")))
}

#[instrument(skip(state, payload))]
pub async fn request_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RequestEmail>,
) -> ApiResult<Json<MessageResponse>> {
    let email = normalize_email(&payload.email);
    if let Some(user) = User::find_by_email(&state.db, &email).await? {
        if user.confirmed {
            return Ok(Json(MessageResponse::new("Your email is already confirmed")));
        }
        send_confirmation(&state, &user)?;
    }
    Ok(Json(MessageResponse::new("Check your email for confirmation.")))
}
