use sqlx::{Pool, Sqlite};

use crate::db::models::{NewUser, User, UserProfile, UserSummary};
use crate::db::{constraint_error, now_millis};
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    /// Insert a user; `join_at` and `last_login_at` both start at now.
    pub async fn create(pool: &Pool<Sqlite>, user: NewUser) -> Result<User, AppError> {
        let now = now_millis();

        let created = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (username, password, first_name, last_name, phone, join_at, last_login_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| constraint_error(e, &user.username))?;

        Ok(created)
    }

    pub async fn get_by_username(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn get_profile(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
SELECT username, first_name, last_name, phone, join_at, last_login_at
FROM users
WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Bump `last_login_at`, never letting it stand still or go backwards.
    ///
    /// Returns the new value, or `None` when the user does not exist.
    pub async fn touch_login(pool: &Pool<Sqlite>, username: &str) -> Result<Option<i64>, AppError> {
        let stamp = sqlx::query_scalar::<_, i64>(
            r#"
UPDATE users
SET last_login_at = MAX(?, last_login_at + 1)
WHERE username = ?
RETURNING last_login_at
            "#,
        )
        .bind(now_millis())
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(stamp)
    }

    /// Like [`touch_login`](Self::touch_login), but only while the stored
    /// digest is still `digest`. One statement, so the check and the write
    /// cannot be split by another request.
    pub async fn touch_login_if_digest(
        pool: &Pool<Sqlite>,
        username: &str,
        digest: &str,
    ) -> Result<Option<i64>, AppError> {
        let stamp = sqlx::query_scalar::<_, i64>(
            r#"
UPDATE users
SET last_login_at = MAX(?, last_login_at + 1)
WHERE username = ? AND password = ?
RETURNING last_login_at
            "#,
        )
        .bind(now_millis())
        .bind(username)
        .bind(digest)
        .fetch_optional(pool)
        .await?;

        Ok(stamp)
    }

    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT username, first_name, last_name, phone FROM users ORDER BY username",
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
