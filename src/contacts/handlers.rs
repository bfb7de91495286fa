use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::{
    birthdays::DEFAULT_WINDOW_DAYS,
    dto::{ContactBody, ContactPath, ContactQuery, ContactResponse, FavoriteBody},
    repo_types::Contact,
};
use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, ApiResult},
    extract::{ValidatedJson, ValidatedPath, ValidatedQuery},
    state::AppState,
};

pub fn contacts_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(read_contact)
                .put(update_contact)
                .patch(update_favorite)
                .delete(delete_contact),
        )
}

pub fn birthdays_routes() -> Router<AppState> {
    Router::new().route("/birthdays", get(upcoming_birthdays))
}

fn to_response(contacts: Vec<Contact>) -> Vec<ContactResponse> {
    contacts.into_iter().map(ContactResponse::from).collect()
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_contacts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedQuery(q): ValidatedQuery<ContactQuery>,
) -> ApiResult<Json<Vec<ContactResponse>>> {
    let contacts = Contact::list(&state.db, user.id, &q.filter(), q.limit, q.offset).await?;
    Ok(Json(to_response(contacts)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn read_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(path): ValidatedPath<ContactPath>,
) -> ApiResult<Json<ContactResponse>> {
    let contact = Contact::get(&state.db, user.id, path.id)
        .await?
        .ok_or(ApiError::NotFound("contact"))?;
    Ok(Json(contact.into()))
}

#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn create_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<ContactBody>,
) -> ApiResult<(StatusCode, Json<ContactResponse>)> {
    let contact = Contact::create(&state.db, user.id, &body).await?;
    info!(contact_id = contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact.into())))
}

#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn update_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(path): ValidatedPath<ContactPath>,
    ValidatedJson(body): ValidatedJson<ContactBody>,
) -> ApiResult<Json<ContactResponse>> {
    let contact = Contact::update(&state.db, user.id, path.id, &body)
        .await?
        .ok_or(ApiError::NotFound("contact"))?;
    info!(contact_id = contact.id, "contact updated");
    Ok(Json(contact.into()))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn update_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(path): ValidatedPath<ContactPath>,
    ValidatedJson(body): ValidatedJson<FavoriteBody>,
) -> ApiResult<Json<ContactResponse>> {
    let contact = Contact::update_favorite(&state.db, user.id, path.id, body.favorite)
        .await?
        .ok_or(ApiError::NotFound("contact"))?;
    Ok(Json(contact.into()))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(path): ValidatedPath<ContactPath>,
) -> ApiResult<StatusCode> {
    Contact::delete(&state.db, user.id, path.id)
        .await?
        .ok_or(ApiError::NotFound("contact"))?;
    info!(contact_id = path.id, "contact deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Contacts with a birthday within the next week, counted from today (UTC).
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ContactResponse>>> {
    let today = OffsetDateTime::now_utc().date();
    let contacts =
        Contact::upcoming_birthdays(&state.db, user.id, today, DEFAULT_WINDOW_DAYS).await?;
    Ok(Json(to_response(contacts)))
}
