use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::Date;
use validator::{Validate, ValidationError};

use super::repo_types::{Contact, ContactFilter};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

fn default_limit() -> i64 {
    10
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9 ()\-]*$").unwrap();
    }
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("phone may contain digits, spaces, dashes, parentheses and a leading +".into());
        Err(err)
    }
}

/// Body of `POST /contacts` and `PUT /contacts/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactBody {
    #[validate(length(min = 3, max = 50, message = "first_name must be 3 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 3, max = 50, message = "last_name must be 3 to 50 characters"))]
    pub last_name: String,
    #[validate(
        email(message = "email format is invalid"),
        length(max = 50, message = "email must not exceed 50 characters")
    )]
    pub email: String,
    #[serde(with = "iso_date")]
    pub birth_date: Date,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    #[validate(
        length(max = 12, message = "phone must not exceed 12 characters"),
        custom(function = "validate_phone")
    )]
    pub phone: String,
}

/// Body of `PATCH /contacts/{id}`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct FavoriteBody {
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct ContactPath {
    #[validate(range(min = 1, message = "id must be a positive integer"))]
    pub id: i32,
}

/// Query string of `GET /contacts`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, max = 1000, message = "limit must be between 0 and 1000"))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: i64,
    pub favorite: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ContactQuery {
    pub fn filter(&self) -> ContactFilter {
        ContactFilter {
            favorite: self.favorite,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "iso_date")]
    pub birth_date: Date,
    pub favorite: bool,
    pub phone: String,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
            birth_date: c.birth_date,
            favorite: c.favorite,
            phone: c.phone,
        }
    }
}
