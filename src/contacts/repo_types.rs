use sqlx::FromRow;
use time::Date;

/// Contact record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Contact {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Date,
    pub favorite: bool,
    pub phone: String,
    pub user_id: i32, // owner
}

/// Optional list filters. `None` leaves the column out of the predicate.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub favorite: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}
