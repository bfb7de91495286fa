//! Contact queries. Every function takes the owner's id and puts it in the
//! `WHERE` clause, so rows of other users are never read or written.

use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;

use super::{
    birthdays::window_keys,
    dto::ContactBody,
    repo_types::{Contact, ContactFilter},
};

/// Escape `LIKE` metacharacters so user input is matched literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn list_query(
    user_id: i32,
    filter: &ContactFilter,
    limit: i64,
    offset: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT id, first_name, last_name, email, birth_date, favorite, phone, user_id \
         FROM contacts WHERE user_id = ",
    );
    qb.push_bind(user_id);

    if let Some(favorite) = filter.favorite {
        qb.push(" AND favorite = ").push_bind(favorite);
    }
    let prefixes = [
        ("first_name", &filter.first_name),
        ("last_name", &filter.last_name),
        ("email", &filter.email),
    ];
    for (column, prefix) in prefixes {
        if let Some(prefix) = prefix {
            qb.push(" AND ")
                .push(column)
                .push(" LIKE ")
                .push_bind(format!("{}%", escape_like(prefix)))
                .push(r" ESCAPE '\'");
        }
    }

    qb.push(" ORDER BY id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    qb
}

impl Contact {
    /// One page of the owner's contacts; all set filters must match.
    pub async fn list(
        db: &PgPool,
        user_id: i32,
        filter: &ContactFilter,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Contact>> {
        list_query(user_id, filter, limit, offset)
            .build_query_as::<Contact>()
            .fetch_all(db)
            .await
    }

    pub async fn get(db: &PgPool, user_id: i32, id: i32) -> sqlx::Result<Option<Contact>> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, first_name, last_name, email, birth_date, favorite, phone, user_id
            FROM contacts
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Fails with a unique violation when the owner already has a contact with this email.
    pub async fn create(db: &PgPool, user_id: i32, body: &ContactBody) -> sqlx::Result<Contact> {
        sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (first_name, last_name, email, birth_date, favorite, phone, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, first_name, last_name, email, birth_date, favorite, phone, user_id
            "#,
        )
        .bind(&body.first_name)
        .bind(&body.last_name)
        .bind(&body.email)
        .bind(body.birth_date)
        .bind(body.favorite)
        .bind(&body.phone)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        user_id: i32,
        id: i32,
        body: &ContactBody,
    ) -> sqlx::Result<Option<Contact>> {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
               SET first_name = $3, last_name = $4, email = $5,
                   birth_date = $6, favorite = $7, phone = $8
             WHERE id = $1 AND user_id = $2
            RETURNING id, first_name, last_name, email, birth_date, favorite, phone, user_id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&body.first_name)
        .bind(&body.last_name)
        .bind(&body.email)
        .bind(body.birth_date)
        .bind(body.favorite)
        .bind(&body.phone)
        .fetch_optional(db)
        .await
    }

    pub async fn update_favorite(
        db: &PgPool,
        user_id: i32,
        id: i32,
        favorite: bool,
    ) -> sqlx::Result<Option<Contact>> {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts SET favorite = $3
             WHERE id = $1 AND user_id = $2
            RETURNING id, first_name, last_name, email, birth_date, favorite, phone, user_id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(favorite)
        .fetch_optional(db)
        .await
    }

    /// Removes the contact and returns it as it was.
    pub async fn delete(db: &PgPool, user_id: i32, id: i32) -> sqlx::Result<Option<Contact>> {
        sqlx::query_as::<_, Contact>(
            r#"
            DELETE FROM contacts
             WHERE id = $1 AND user_id = $2
            RETURNING id, first_name, last_name, email, birth_date, favorite, phone, user_id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Contacts whose birthday (month and day) falls in `[today, today + window_days]`.
    pub async fn upcoming_birthdays(
        db: &PgPool,
        user_id: i32,
        today: Date,
        window_days: u32,
    ) -> sqlx::Result<Vec<Contact>> {
        let keys = window_keys(today, window_days);
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, first_name, last_name, email, birth_date, favorite, phone, user_id
            FROM contacts
            WHERE user_id = $1
              AND CAST(EXTRACT(MONTH FROM birth_date) AS INTEGER) * 100
                + CAST(EXTRACT(DAY FROM birth_date) AS INTEGER) = ANY($2)
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .bind(keys)
        .fetch_all(db)
        .await
    }
}
