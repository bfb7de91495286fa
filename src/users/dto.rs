use serde::Serialize;
use time::OffsetDateTime;

use super::repo_types::User;

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub confirmed: bool,
    pub avatar: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            confirmed: u.confirmed,
            avatar: u.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn user_response_hides_secrets() {
        let user = User {
            id: 1,
            username: "annlee".into(),
            email: "ann@x.com".into(),
            password: "$argon2id$secret".into(),
            created_at: datetime!(2023-03-14 12:00 UTC),
            refresh_token: Some("refresh".into()),
            confirmed: true,
            avatar: None,
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("ann@x.com"));
        assert!(json.contains("2023-03-14T12:00:00Z"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("refresh"));
    }
}
