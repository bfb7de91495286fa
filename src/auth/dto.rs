use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::users::dto::UserResponse;

fn trimmed<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let raw = String::deserialize(de)?;
    Ok(raw.trim().to_string())
}

/// Request body for user registration. `username` is trimmed before the
/// length rule runs.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 5, max = 16, message = "username must be 5 to 16 characters"))]
    pub username: String,
    #[validate(email(message = "email format is invalid"))]
    pub email: String,
    #[validate(length(min = 6, max = 64, message = "password must be 6 to 64 characters"))]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email format is invalid"))]
    pub email: String,
    pub password: String,
}

/// Request body for re-sending the confirmation email.
#[derive(Debug, Deserialize, Validate)]
pub struct RequestEmail {
    #[validate(email(message = "email format is invalid"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: UserResponse,
    pub detail: String,
}

/// Token pair returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_validation() {
        let ok = SignupRequest {
            username: "annlee".into(),
            email: "ann@x.com".into(),
            password: "secret1".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = SignupRequest {
            username: "ann".into(),
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn padded_username_is_measured_after_trimming() {
        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "username": "    a    ",
            "email": "ann@x.com",
            "password": "secret1"
        }))
        .unwrap();
        assert_eq!(req.username, "a");
        assert!(req.validate().unwrap_err().field_errors().contains_key("username"));

        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "username": "  annlee  ",
            "email": "ann@x.com",
            "password": "secret1"
        }))
        .unwrap();
        assert_eq!(req.username, "annlee");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn token_response_is_bearer() {
        let json = serde_json::to_value(TokenResponse::bearer("a".into(), "r".into())).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token"], "r");
    }
}
