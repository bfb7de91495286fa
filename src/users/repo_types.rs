use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String, // argon2 PHC string, never serialized
    pub created_at: OffsetDateTime,
    pub refresh_token: Option<String>,
    pub confirmed: bool,
    pub avatar: Option<String>,
}
