use sqlx::{Pool, Sqlite};

use crate::db::{
    Message, MessageDetail, MessageRepository, ReadReceipt, ReceivedMessage, SentMessage,
};
use crate::error::AppError;
use crate::service::access;

/// Message operations with the access rules applied.
#[derive(Clone)]
pub struct MessagingService {
    db: Pool<Sqlite>,
}

impl MessagingService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn send(&self, from: &str, to: &str, body: &str) -> Result<Message, AppError> {
        let message = MessageRepository::create(&self.db, from, to, body).await?;
        tracing::debug!(id = message.id, from = %from, to = %to, "message sent");
        Ok(message)
    }

    async fn fetch(&self, id: i64) -> Result<MessageDetail, AppError> {
        MessageRepository::get_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No such message: {}", id)))
    }

    pub async fn get(&self, id: i64, requester: &str) -> Result<MessageDetail, AppError> {
        let message = self.fetch(id).await?;
        if !access::can_read(&message, requester) {
            tracing::warn!(id, requester = %requester, "read denied");
            return Err(AppError::Unauthorized(
                "Not a party to this message".to_string(),
            ));
        }
        Ok(message)
    }

    pub async fn mark_read(&self, id: i64, requester: &str) -> Result<ReadReceipt, AppError> {
        let message = self.fetch(id).await?;
        if !access::can_mark_read(&message, requester) {
            tracing::warn!(id, requester = %requester, "mark-read denied");
            return Err(AppError::Unauthorized(
                "Message not for you".to_string(),
            ));
        }
        MessageRepository::mark_read(&self.db, id).await
    }

    pub async fn list_from(&self, username: &str) -> Result<Vec<SentMessage>, AppError> {
        MessageRepository::list_from(&self.db, username).await
    }

    pub async fn list_to(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError> {
        MessageRepository::list_to(&self.db, username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::service::identity::{IdentityService, Registration};

    async fn setup() -> (IdentityService, MessagingService) {
        let pool = db::in_memory().await.unwrap();
        let identity = IdentityService::new(pool.clone());
        for (name, pw) in [("alice", "pw1"), ("bob", "pw2"), ("carol", "pw3")] {
            identity
                .register(Registration {
                    username: name.to_string(),
                    password: pw.to_string(),
                    first_name: name.to_string(),
                    last_name: "Doe".to_string(),
                    phone: "555".to_string(),
                })
                .await
                .unwrap();
        }
        (identity, MessagingService::new(pool))
    }

    #[tokio::test]
    async fn test_alice_bob_carol_scenario() {
        let (_identity, messages) = setup().await;

        let sent = messages.send("alice", "bob", "hi").await.unwrap();

        let seen_by_bob = messages.get(sent.id, "bob").await.unwrap();
        assert_eq!(seen_by_bob.body, "hi");
        assert!(seen_by_bob.read_at.is_none());

        let receipt = messages.mark_read(sent.id, "bob").await.unwrap();
        assert!(receipt.read_at >= sent.sent_at);

        let seen_by_alice = messages.get(sent.id, "alice").await.unwrap();
        assert_eq!(seen_by_alice.read_at, Some(receipt.read_at));

        assert!(matches!(
            messages.mark_read(sent.id, "alice").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            messages.get(sent.id, "carol").await,
            Err(AppError::Unauthorized(_))
        ));

        let outbox = messages.list_from("alice").await.unwrap();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].to_user.username, "bob");

        let inbox = messages.list_to("bob").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].from_user.username, "alice");
    }

    #[tokio::test]
    async fn test_denied_mark_read_leaves_message_unread() {
        let (_identity, messages) = setup().await;
        let sent = messages.send("alice", "bob", "hi").await.unwrap();

        assert!(messages.mark_read(sent.id, "carol").await.is_err());
        assert!(messages.get(sent.id, "bob").await.unwrap().read_at.is_none());
    }

    #[tokio::test]
    async fn test_missing_message() {
        let (_identity, messages) = setup().await;
        assert!(matches!(
            messages.get(42, "alice").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            messages.mark_read(42, "alice").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_send_to_unknown_user() {
        let (_identity, messages) = setup().await;
        assert!(matches!(
            messages.send("alice", "mallory", "hi").await,
            Err(AppError::UnknownUser(_))
        ));
    }
}
