use serde::Serialize;
use sqlx::FromRow;

/// Full user row. Only the credential store and identity service see this.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub join_at: i64,
    pub last_login_at: i64,
}

/// Fields needed to insert a user; `password` is already a digest here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub join_at: i64,
    pub last_login_at: i64,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            join_at: user.join_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Message {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
}

/// A message with both parties expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDetail {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

/// Entry of a user's outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessage {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub to_user: UserSummary,
}

/// Entry of a user's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedMessage {
    pub id: i64,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub from_user: UserSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct ReadReceipt {
    pub id: i64,
    pub read_at: i64,
}
