use sqlx::PgPool;

use super::repo_types::User;

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, created_at, refresh_token, confirmed, avatar
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i32) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, created_at, refresh_token, confirmed, avatar
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user; id, created_at and confirmed come from column defaults.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password, created_at, refresh_token, confirmed, avatar
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Store the current refresh token, or clear it with `None`.
    pub async fn set_refresh_token(
        db: &PgPool,
        user_id: i32,
        token: Option<&str>,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(user_id)
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Mark the user as confirmed. `None` when no user has this email.
    pub async fn confirm_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET confirmed = TRUE
            WHERE email = $1
            RETURNING id, username, email, password, created_at, refresh_token, confirmed, avatar
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn set_avatar(db: &PgPool, email: &str, url: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET avatar = $2
            WHERE email = $1
            RETURNING id, username, email, password, created_at, refresh_token, confirmed, avatar
            "#,
        )
        .bind(email)
        .bind(url)
        .fetch_optional(db)
        .await
    }
}
