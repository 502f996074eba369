pub mod models;
pub mod users;
pub mod messages;

pub use models::{
    Message, MessageDetail, NewUser, ReadReceipt, ReceivedMessage, SentMessage, User,
    UserProfile, UserSummary,
};
pub use users::UserRepository;
pub use messages::MessageRepository;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::error::AppError;

/// Open a pool against `url` with foreign keys enforced.
///
/// WAL lets readers run alongside the single writer; writers queue on the
/// busy timeout instead of failing with `SQLITE_BUSY`.
pub async fn connect(
    url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<Pool<Sqlite>, AppError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied.
///
/// The connection is never recycled; dropping it would drop the database.
pub async fn in_memory() -> Result<Pool<Sqlite>, AppError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Translate constraint failures into the domain taxonomy.
pub(crate) fn constraint_error(err: sqlx::Error, subject: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::DuplicateIdentity(subject.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::UnknownUser(subject.to_string());
        }
    }
    AppError::Database(err)
}
