use sqlx::{Pool, Sqlite};

use crate::crypto::{hash_password, verify_password};
use crate::db::{NewUser, UserProfile, UserRepository, UserSummary};
use crate::error::AppError;

/// Registration input with the plaintext password.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Registers and authenticates users. The password digest never leaves
/// this service.
#[derive(Clone)]
pub struct IdentityService {
    db: Pool<Sqlite>,
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_off_runtime(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
}

async fn verify_off_runtime(password: String, digest: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
}

impl IdentityService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn register(&self, registration: Registration) -> Result<UserProfile, AppError> {
        let password = hash_off_runtime(registration.password).await?;

        let user = UserRepository::create(
            &self.db,
            NewUser {
                username: registration.username,
                password,
                first_name: registration.first_name,
                last_name: registration.last_name,
                phone: registration.phone,
            },
        )
        .await?;

        tracing::info!(username = %user.username, "registered user");
        Ok(user.into())
    }

    /// Unknown usernames and wrong passwords both yield `false`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AppError> {
        match UserRepository::get_by_username(&self.db, username).await? {
            Some(user) => verify_off_runtime(password.to_string(), user.password).await,
            None => Ok(false),
        }
    }

    pub async fn record_login(&self, username: &str) -> Result<(), AppError> {
        UserRepository::touch_login(&self.db, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {}", username)))?;
        Ok(())
    }

    /// Verify credentials and record the login as one step.
    ///
    /// The hash is checked without holding any lock; the timestamp is then
    /// written by a single statement conditioned on the digest that was
    /// verified. On `false` nothing is written.
    pub async fn authenticate_and_touch(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        let Some(user) = UserRepository::get_by_username(&self.db, username).await? else {
            return Ok(false);
        };
        if !verify_off_runtime(password.to_string(), user.password.clone()).await? {
            return Ok(false);
        }

        let touched =
            UserRepository::touch_login_if_digest(&self.db, username, &user.password).await?;
        if touched.is_none() {
            // credentials changed or user removed since the read
            return Ok(false);
        }

        tracing::debug!(username = %username, "login recorded");
        Ok(true)
    }

    pub async fn get(&self, username: &str) -> Result<UserProfile, AppError> {
        UserRepository::get_profile(&self.db, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {}", username)))
    }

    pub async fn list_all(&self) -> Result<Vec<UserSummary>, AppError> {
        UserRepository::list(&self.db).await
    }
}
