use sqlx::{FromRow, Pool, Sqlite};

use crate::db::models::{
    Message, MessageDetail, ReadReceipt, ReceivedMessage, SentMessage, UserSummary,
};
use crate::db::{constraint_error, now_millis, UserRepository};
use crate::error::AppError;

#[derive(FromRow)]
struct DetailRow {
    id: i64,
    body: String,
    sent_at: i64,
    read_at: Option<i64>,
    from_username: String,
    from_first_name: String,
    from_last_name: String,
    from_phone: String,
    to_username: String,
    to_first_name: String,
    to_last_name: String,
    to_phone: String,
}

impl From<DetailRow> for MessageDetail {
    fn from(row: DetailRow) -> Self {
        MessageDetail {
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
            from_user: UserSummary {
                username: row.from_username,
                first_name: row.from_first_name,
                last_name: row.from_last_name,
                phone: row.from_phone,
            },
            to_user: UserSummary {
                username: row.to_username,
                first_name: row.to_first_name,
                last_name: row.to_last_name,
                phone: row.to_phone,
            },
        }
    }
}

/// A message joined with the other party of a listing.
#[derive(FromRow)]
struct ListedRow {
    id: i64,
    body: String,
    sent_at: i64,
    read_at: Option<i64>,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
}

impl ListedRow {
    fn party(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
INSERT INTO messages (from_username, to_username, body, sent_at, read_at)
VALUES (?, ?, ?, ?, NULL)
RETURNING id, from_username, to_username, body, sent_at, read_at
            "#,
        )
        .bind(from_username)
        .bind(to_username)
        .bind(body)
        .bind(now_millis())
        .fetch_one(pool)
        .await;

        match message {
            Ok(message) => Ok(message),
            Err(e) => match constraint_error(e, to_username) {
                AppError::UnknownUser(_) => {
                    Err(Self::missing_party(pool, from_username, to_username).await)
                }
                other => Err(other),
            },
        }
    }

    /// Name the party whose row is absent after a foreign-key failure.
    async fn missing_party(
        pool: &Pool<Sqlite>,
        from_username: &str,
        to_username: &str,
    ) -> AppError {
        match UserRepository::get_by_username(pool, from_username).await {
            Ok(None) => AppError::UnknownUser(from_username.to_string()),
            Ok(Some(_)) => AppError::UnknownUser(to_username.to_string()),
            Err(e) => e,
        }
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: i64,
    ) -> Result<Option<MessageDetail>, AppError> {
        let row = sqlx::query_as::<_, DetailRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       f.username AS from_username, f.first_name AS from_first_name,
       f.last_name AS from_last_name, f.phone AS from_phone,
       t.username AS to_username, t.first_name AS to_first_name,
       t.last_name AS to_last_name, t.phone AS to_phone
FROM messages m
JOIN users f ON m.from_username = f.username
JOIN users t ON m.to_username = t.username
WHERE m.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(MessageDetail::from))
    }

    /// Stamp `read_at`. A repeat call overwrites the previous stamp; the
    /// value never precedes `sent_at`.
    pub async fn mark_read(pool: &Pool<Sqlite>, id: i64) -> Result<ReadReceipt, AppError> {
        let receipt = sqlx::query_as::<_, ReadReceipt>(
            r#"
UPDATE messages
SET read_at = MAX(?, sent_at)
WHERE id = ?
RETURNING id, read_at
            "#,
        )
        .bind(now_millis())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No such message: {}", id)))?;

        Ok(receipt)
    }

    pub async fn list_from(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Vec<SentMessage>, AppError> {
        let rows = sqlx::query_as::<_, ListedRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       u.username, u.first_name, u.last_name, u.phone
FROM messages m
JOIN users u ON m.to_username = u.username
WHERE m.from_username = ?
ORDER BY m.id
            "#,
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SentMessage {
                to_user: row.party(),
                id: row.id,
                body: row.body,
                sent_at: row.sent_at,
                read_at: row.read_at,
            })
            .collect())
    }

    pub async fn list_to(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Vec<ReceivedMessage>, AppError> {
        let rows = sqlx::query_as::<_, ListedRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       u.username, u.first_name, u.last_name, u.phone
FROM messages m
JOIN users u ON m.from_username = u.username
WHERE m.to_username = ?
ORDER BY m.id
            "#,
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReceivedMessage {
                from_user: row.party(),
                id: row.id,
                body: row.body,
                sent_at: row.sent_at,
                read_at: row.read_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, NewUser};

    async fn setup() -> Pool<Sqlite> {
        let pool = db::in_memory().await.unwrap();
        for name in ["alice", "bob"] {
            UserRepository::create(
                &pool,
                NewUser {
                    username: name.to_string(),
                    password: "digest".to_string(),
                    first_name: name.to_uppercase(),
                    last_name: "Example".to_string(),
                    phone: "555".to_string(),
                },
            )
            .await
            .unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_create_and_get_detail() {
        let pool = setup().await;

        let message = MessageRepository::create(&pool, "alice", "bob", "hi").await.unwrap();
        assert!(message.read_at.is_none());

        let detail = MessageRepository::get_by_id(&pool, message.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.body, "hi");
        assert_eq!(detail.from_user.username, "alice");
        assert_eq!(detail.from_user.first_name, "ALICE");
        assert_eq!(detail.to_user.username, "bob");

        assert!(MessageRepository::get_by_id(&pool, message.id + 100)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_recipient() {
        let pool = setup().await;
        let err = MessageRepository::create(&pool, "alice", "carol", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownUser(name) if name == "carol"));
    }

    #[tokio::test]
    async fn test_unknown_sender() {
        let pool = setup().await;
        let err = MessageRepository::create(&pool, "ghost", "bob", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownUser(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_mark_read() {
        let pool = setup().await;
        let message = MessageRepository::create(&pool, "alice", "bob", "hi").await.unwrap();

        let receipt = MessageRepository::mark_read(&pool, message.id).await.unwrap();
        assert_eq!(receipt.id, message.id);
        assert!(receipt.read_at >= message.sent_at);

        let detail = MessageRepository::get_by_id(&pool, message.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.read_at, Some(receipt.read_at));

        assert!(matches!(
            MessageRepository::mark_read(&pool, 9999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listings() {
        let pool = setup().await;
        MessageRepository::create(&pool, "alice", "bob", "one").await.unwrap();
        MessageRepository::create(&pool, "alice", "bob", "two").await.unwrap();
        MessageRepository::create(&pool, "bob", "alice", "back").await.unwrap();

        let sent = MessageRepository::list_from(&pool, "alice").await.unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].body, "one");
        assert!(sent.iter().all(|m| m.to_user.username == "bob"));

        let received = MessageRepository::list_to(&pool, "alice").await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].from_user.username, "bob");
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let pool = setup().await;
        assert!(MessageRepository::list_from(&pool, "bob").await.unwrap().is_empty());
        assert!(MessageRepository::list_to(&pool, "bob").await.unwrap().is_empty());
    }
}
